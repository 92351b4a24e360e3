use super::test_utils::*;

#[test]
fn add_should_store_when_key_is_absent() {
    let server = create_server();
    let key = Bytes::from("key");
    let record = Record::new(from_string("data"), 0, 0);
    let result = server.storage.add(key.clone(), record.clone());
    assert!(result.is_ok());
    assert_eq!(result.unwrap().cas, 1);

    let found = server.storage.get(&key).unwrap();
    assert_eq!(found, record);
}

#[test]
fn add_should_not_store_when_key_is_live() {
    let server = create_server();
    let key = Bytes::from("key");
    let original = Record::new(from_string("original"), 0, 0);
    assert!(server.storage.set(key.clone(), original.clone()).is_ok());

    let replacement = Record::new(from_string("replacement"), 0, 0);
    let result = server.storage.add(key.clone(), replacement);
    match result {
        Ok(_status) => unreachable!(),
        Err(err) => assert_eq!(err, CacheError::NotStored),
    }

    // the stored value is untouched
    let found = server.storage.get(&key).unwrap();
    assert_eq!(found, original);
    assert_eq!(found.header().cas(), 1);
}

#[test]
fn add_should_store_over_expired_value() {
    let server = create_server();
    let key = Bytes::from("key");
    let record = Record::new(from_string("short lived"), 0, 5);
    assert!(server.storage.set(key.clone(), record).is_ok());

    server.timer.set(10);
    let replacement = Record::new(from_string("fresh"), 0, 0);
    let result = server.storage.add(key.clone(), replacement.clone());
    assert!(result.is_ok());
    assert_eq!(result.unwrap().cas, 1);

    let found = server.storage.get(&key).unwrap();
    assert_eq!(found, replacement);
}
