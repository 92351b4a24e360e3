mod common;

#[test]
fn add_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    // first add stores
    client.add("foo", "bar", 0).unwrap();
    let value: Option<String> = client.get("foo").unwrap();
    assert_eq!(value, Some(String::from("bar")));

    // second add is rejected and leaves the value alone
    let result = client.add("foo", "baz", 0);
    assert!(result.is_err());
    let value: Option<String> = client.get("foo").unwrap();
    assert_eq!(value, Some(String::from("bar")));
}
