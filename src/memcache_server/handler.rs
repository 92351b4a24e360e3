use crate::cache::error::CacheError;
use crate::memcache::store;
use crate::protocol::text::decoder::{
    CounterRequest, DeleteRequest, RetrievalRequest, StoreRequest, TextRequest, TouchRequest,
};
use crate::protocol::text::encoder::{TextResponse, ValueEntry};
use std::sync::Arc;

fn storage_error_to_response(err: CacheError) -> TextResponse {
    match err {
        CacheError::NotFound => TextResponse::NotFound,
        CacheError::KeyExists => TextResponse::Exists,
        CacheError::NotStored => TextResponse::NotStored,
        CacheError::ArithOnNonNumeric => TextResponse::ClientError(String::from(
            "cannot increment or decrement non-numeric value",
        )),
    }
}

fn into_record(request: &StoreRequest) -> store::Record {
    store::Record::new(request.data.clone(), request.flags, request.exp_time)
}

pub struct TextHandler {
    storage: Arc<store::MemcStore>,
}

impl TextHandler {
    pub fn new(store: Arc<store::MemcStore>) -> TextHandler {
        TextHandler { storage: store }
    }

    /// Executes a single request against the store. Returns None when
    /// the command carried noreply and the outcome is not a protocol
    /// error.
    pub fn handle_request(&self, req: TextRequest) -> Option<TextResponse> {
        let noreply = req.is_noreply();
        let response = match req {
            TextRequest::Get(request) => self.get(request, false),
            TextRequest::Gets(request) => self.get(request, true),
            TextRequest::Set(request) => self.set(request),
            TextRequest::Add(request) => self.add(request),
            TextRequest::Replace(request) => self.replace(request),
            TextRequest::Append(request) => self.concat(request, true),
            TextRequest::Prepend(request) => self.concat(request, false),
            TextRequest::Cas(request) => self.cas(request),
            TextRequest::Delete(request) => self.delete(request),
            TextRequest::Increment(request) => self.counter(request, true),
            TextRequest::Decrement(request) => self.counter(request, false),
            TextRequest::Touch(request) => self.touch(request),
        };
        if noreply && !response.is_protocol_error() {
            return None;
        }
        Some(response)
    }

    /// Snapshots are cloned out of the store before anything is
    /// written, missing and expired keys are silently omitted.
    fn get(&self, request: RetrievalRequest, with_cas: bool) -> TextResponse {
        let mut entries = Vec::with_capacity(request.keys.len());
        for key in request.keys {
            if let Ok(record) = self.storage.get(&key) {
                entries.push(ValueEntry {
                    key,
                    flags: record.header().flags(),
                    cas: record.header().cas(),
                    data: record.value().clone(),
                });
            }
        }
        TextResponse::Values { entries, with_cas }
    }

    fn set(&self, request: StoreRequest) -> TextResponse {
        let record = into_record(&request);
        match self.storage.set(request.key, record) {
            Ok(_status) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn add(&self, request: StoreRequest) -> TextResponse {
        let record = into_record(&request);
        match self.storage.add(request.key, record) {
            Ok(_status) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn replace(&self, request: StoreRequest) -> TextResponse {
        let record = into_record(&request);
        match self.storage.replace(request.key, record) {
            Ok(_status) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn concat(&self, request: StoreRequest, append: bool) -> TextResponse {
        let record = into_record(&request);
        let result = if append {
            self.storage.append(request.key, record)
        } else {
            self.storage.prepend(request.key, record)
        };
        match result {
            Ok(_status) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn cas(&self, request: StoreRequest) -> TextResponse {
        let record = into_record(&request);
        match self
            .storage
            .check_and_set(request.key, record, request.cas_unique)
        {
            Ok(_status) => TextResponse::Stored,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn delete(&self, request: DeleteRequest) -> TextResponse {
        match self.storage.delete(request.key) {
            Ok(_record) => TextResponse::Deleted,
            Err(err) => storage_error_to_response(err),
        }
    }

    fn counter(&self, request: CounterRequest, increment: bool) -> TextResponse {
        let result = if increment {
            self.storage.increment(request.key, request.delta)
        } else {
            self.storage.decrement(request.key, request.delta)
        };
        match result {
            Ok(delta_result) => TextResponse::Counter(delta_result.value),
            Err(err) => storage_error_to_response(err),
        }
    }

    fn touch(&self, request: TouchRequest) -> TextResponse {
        match self.storage.touch(request.key, request.exp_time) {
            Ok(()) => TextResponse::Touched,
            Err(err) => storage_error_to_response(err),
        }
    }
}
