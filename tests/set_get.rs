mod common;

#[test]
fn set_get_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    // set a string value
    client.set("foo", "bar", 0).unwrap();

    // retrieve it back
    let value: Option<String> = client.get("foo").unwrap();
    assert_eq!(value, Some(String::from("bar")));
}

#[test]
fn set_get_large_value_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    let value = common::create_value_with_size(64 * 1024);
    client.set("large", value.as_str(), 0).unwrap();

    let returned: Option<String> = client.get("large").unwrap();
    assert_eq!(returned, Some(value));
}

#[test]
fn get_missing_key_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    let value: Option<String> = client.get("missing").unwrap();
    assert_eq!(value, None);
}
