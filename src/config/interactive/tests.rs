use super::*;

#[test]
fn mask_secret_hides_all_but_prefix() {
    assert_eq!(mask_secret(""), "(not set)");
    assert_eq!(mask_secret("abc"), "abc…");
    assert_eq!(mask_secret("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJh…");
}
