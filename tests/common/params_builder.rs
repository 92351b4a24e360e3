use memtext::memcache::cli::parser::RuntimeType;

pub struct MemtextdServerParamsBuilder {
    runtime: RuntimeType,
    port: u16,
    idle_timeout: u64,
}

impl MemtextdServerParamsBuilder {
    pub fn new() -> MemtextdServerParamsBuilder {
        MemtextdServerParamsBuilder {
            runtime: RuntimeType::MultiThread,
            port: 1234,
            idle_timeout: 0,
        }
    }

    #[allow(dead_code)]
    pub fn with_runtime(&mut self, runtime: RuntimeType) -> &mut Self {
        self.runtime = runtime;
        self
    }

    pub fn with_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    #[allow(dead_code)]
    pub fn with_idle_timeout(&mut self, idle_timeout: u64) -> &mut Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn build(&self) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        result.push(String::from("./target/debug/memtextd"));

        match self.runtime {
            RuntimeType::CurrentThread => {
                result.push(String::from("--runtime-type"));
                result.push(String::from("current-thread"));
            }
            RuntimeType::MultiThread => {
                result.push(String::from("--runtime-type"));
                result.push(String::from("multi-thread"));
            }
        }

        result.push(String::from("--port"));
        result.push(self.port.to_string());

        result.push(String::from("--idle-timeout"));
        result.push(self.idle_timeout.to_string());

        result
    }
}
