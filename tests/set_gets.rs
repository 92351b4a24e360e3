use std::collections::HashMap;

mod common;

#[test]
fn set_gets_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    client.set("foo", "bar", 0).unwrap();

    let result: HashMap<String, (Vec<u8>, u32, Option<u64>)> = client.gets(&["foo"]).unwrap();
    let (value, _flags, cas) = result.get("foo").unwrap();
    assert_eq!(value, &b"bar".to_vec());
    assert_eq!(*cas, Some(1));
}

#[test]
fn cas_check() {
    let params_builder = common::MemtextdServerParamsBuilder::new();
    let server_handle = common::spawn_server(params_builder);
    let client = memcache::connect(server_handle.get_connection_string()).unwrap();

    client.set("foo", "bar", 0).unwrap();
    let result: HashMap<String, (Vec<u8>, u32, Option<u64>)> = client.gets(&["foo"]).unwrap();
    let (_value, _flags, cas) = result.get("foo").unwrap();
    let cas = cas.unwrap();

    // first cas with the current token wins
    let swapped = client.cas("foo", "baz", 0, cas).unwrap();
    assert!(swapped);

    // the stale token loses
    let swapped = client.cas("foo", "nope", 0, cas).unwrap();
    assert!(!swapped);

    let value: Option<String> = client.get("foo").unwrap();
    assert_eq!(value, Some(String::from("baz")));
}
