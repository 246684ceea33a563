use openlms::openlms_core::{hash_password, verify_password};

#[test]
fn test_hashes_are_salted() {
    let first = hash_password("samepassword").unwrap();
    let second = hash_password("samepassword").unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with("$2"));
    assert!(verify_password("samepassword", &first).unwrap());
    assert!(verify_password("samepassword", &second).unwrap());
}

#[test]
fn test_verify_is_case_sensitive() {
    let hash = hash_password("Password123").unwrap();

    assert!(verify_password("Password123", &hash).unwrap());
    assert!(!verify_password("password123", &hash).unwrap());
    assert!(!verify_password("PASSWORD123", &hash).unwrap());
}

#[test]
fn test_special_and_unicode_characters() {
    for password in ["p@ssw0rd!#$%^&*()", "пароль密码🔒", ""] {
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap(), "password: {password:?}");
    }
}

#[test]
fn test_malformed_stored_hash_is_an_error() {
    let err = verify_password("edx", "not_a_valid_bcrypt_hash").unwrap_err();
    assert!(err.status.is_server_error());
}
