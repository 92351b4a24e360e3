use super::test_utils::*;

#[test]
fn replace_should_fail_when_key_is_absent() {
    let server = create_server();
    let key = Bytes::from("key");
    let record = Record::new(from_string("data"), 0, 0);
    let result = server.storage.replace(key, record);
    match result {
        Ok(_status) => unreachable!(),
        Err(err) => assert_eq!(err, CacheError::NotStored),
    }
}

#[test]
fn replace_should_store_over_live_value() {
    let server = create_server();
    let key = Bytes::from("key");
    let original = Record::new(from_string("original"), 0, 0);
    assert!(server.storage.set(key.clone(), original).is_ok());

    let replacement = Record::new(from_string("replacement"), 0, 0);
    let result = server.storage.replace(key.clone(), replacement.clone());
    assert!(result.is_ok());
    assert_eq!(result.unwrap().cas, 2);

    let found = server.storage.get(&key).unwrap();
    assert_eq!(found, replacement);
}

#[test]
fn replace_should_fail_over_expired_value() {
    let server = create_server();
    let key = Bytes::from("key");
    let record = Record::new(from_string("short lived"), 0, 5);
    assert!(server.storage.set(key.clone(), record).is_ok());

    server.timer.set(10);
    let replacement = Record::new(from_string("fresh"), 0, 0);
    let result = server.storage.replace(key.clone(), replacement);
    match result {
        Ok(_status) => unreachable!(),
        Err(err) => assert_eq!(err, CacheError::NotStored),
    }
    // the expired value was dropped on the way
    assert!(server.storage.is_empty());
}
