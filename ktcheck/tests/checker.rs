use ktcheck::{
    keytab_checksum, CheckError, CheckOutcome, Checker, Kdc, Keyblock, Keytab, KeytabEntry,
    KeytabPrincipal, MemoryKdc, MemorySecretStore, Principal, PrincipalFilter, SecretStore,
};

const SECRET: &str = "web-keytab";
// sha256("17:bb,18:aa")
const CHECKSUM_A: &str = "61d4de6039b13ad0f5ab15276a7607046c826b80ba2d6df3d69715732ed7f3fa";

fn principal(name: &str) -> Principal {
    name.parse().unwrap()
}

fn entry(principal: &Principal, enctype: i32, contents: &[u8]) -> KeytabEntry {
    KeytabEntry {
        principal: KeytabPrincipal::from(principal),
        timestamp: 0,
        vno: 1,
        key: Keyblock {
            enctype,
            contents: contents.to_vec(),
        },
    }
}

fn keytab_bytes(entries: Vec<KeytabEntry>) -> Vec<u8> {
    let mut keytab = Keytab::new();
    for entry in entries {
        keytab.push(entry);
    }
    keytab.to_bytes().unwrap()
}

fn checker_with(
    kdc_principals: &[Principal],
    keytab: Option<&[u8]>,
) -> Checker<MemoryKdc, MemorySecretStore> {
    let secrets = MemorySecretStore::new();
    if let Some(keytab) = keytab {
        secrets.store(SECRET, keytab, true).unwrap();
    }
    Checker::new(MemoryKdc::with_principals(kdc_principals), secrets)
}

struct UnreachableKdc;

impl Kdc for UnreachableKdc {
    fn has_principal(&self, _principal: &Principal) -> anyhow::Result<bool> {
        anyhow::bail!("connection refused")
    }

    fn list_principals(&self, _filter: &PrincipalFilter) -> anyhow::Result<Vec<Principal>> {
        anyhow::bail!("connection refused")
    }

    fn add_missing_principals(&self, _principals: &[Principal]) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    fn delete_principals(&self, _principals: &[Principal]) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    fn export_keytab(&self, _principals: &[Principal]) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("connection refused")
    }
}

/// Fails every call, to prove a code path never reaches the secret store.
struct SealedSecretStore;

impl SecretStore for SealedSecretStore {
    fn load(&self, _name: &str, _binary: bool) -> anyhow::Result<Option<Vec<u8>>> {
        anyhow::bail!("secret store must not be consulted")
    }

    fn store(&self, _name: &str, _contents: &[u8], _binary: bool) -> anyhow::Result<()> {
        anyhow::bail!("secret store must not be consulted")
    }

    fn delete(&self, _name: &str, _binary: bool) -> anyhow::Result<()> {
        anyhow::bail!("secret store must not be consulted")
    }
}

#[test]
fn passes_when_principals_are_in_kdc_and_keytab() {
    let a = principal("HTTP/web.example.com@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&a, 18, &[0xaa]), entry(&a, 17, &[0xbb])]);
    let checker = checker_with(&[a.clone()], Some(&keytab));

    let outcome = checker.check(&[a.clone()], SECRET, true).unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Pass {
            checksum: CHECKSUM_A.to_owned()
        }
    );
    assert_eq!(keytab_checksum(&keytab, &[a]).unwrap(), CHECKSUM_A);
}

#[test]
fn passes_with_text_secrets() {
    let a = principal("HTTP/web.example.com@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&a, 18, &[0xaa]), entry(&a, 17, &[0xbb])]);
    let secrets = MemorySecretStore::new();
    secrets.store(SECRET, &keytab, false).unwrap();
    let checker = Checker::new(MemoryKdc::with_principals([&a]), secrets);

    let outcome = checker.check(&[a], SECRET, false).unwrap();
    assert_eq!(outcome.checksum(), Some(CHECKSUM_A));
}

#[test]
fn deprecated_enctypes_do_not_fail_the_check() {
    let a = principal("a@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&a, 23, &[0xcc]), entry(&a, 6, &[0xdd])]);
    let checker = checker_with(&[a.clone()], Some(&keytab));

    let outcome = checker.check(&[a], SECRET, true).unwrap();
    assert!(outcome.is_pass(), "{outcome:?}");
}

#[test]
fn filters_are_matched_literally_apart_from_wildcards() {
    let dotted = principal("web.example@EXAMPLE.COM");
    let other = principal("webXexample@EXAMPLE.COM");
    let checker = checker_with(&[dotted.clone(), other], None);

    let listing = checker.list("web.example@*", None, true).unwrap();
    assert_eq!(listing.principals, vec![dotted]);
}

#[test]
fn checksum_ignores_principal_order() {
    let a = principal("a@EXAMPLE.COM");
    let b = principal("b/host@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![
        entry(&b, 18, &[0x01, 0x02]),
        entry(&a, 18, &[0xaa]),
        entry(&a, 17, &[0xbb]),
    ]);
    let checker = checker_with(&[a.clone(), b.clone()], Some(&keytab));

    let forward = checker.check(&[a.clone(), b.clone()], SECRET, true).unwrap();
    let backward = checker.check(&[b, a], SECRET, true).unwrap();
    assert_eq!(
        forward.checksum(),
        Some("820f9eac90471cb7127dda21c9239a9e95c9721491208168f7eb80cd9d1077f2")
    );
    assert_eq!(forward, backward);
}

#[test]
fn kdc_miss_short_circuits_before_the_secret_store() {
    let a = principal("a@EXAMPLE.COM");
    let b = principal("b@EXAMPLE.COM");
    let checker = Checker::new(MemoryKdc::with_principals([&b]), SealedSecretStore);

    let outcome = checker.check(&[a, b], SECRET, true).unwrap();
    assert_eq!(
        outcome.reason(),
        Some("Principal 'a@EXAMPLE.COM' does not exist in kerberos")
    );
}

#[test]
fn fails_when_the_secret_is_absent() {
    let a = principal("a@EXAMPLE.COM");
    let checker = checker_with(&[a.clone()], None);

    let outcome = checker.check(&[a], SECRET, true).unwrap();
    assert_eq!(
        outcome.reason(),
        Some("Secret 'web-keytab' does not exist")
    );
}

#[test]
fn fails_when_the_secret_is_empty() {
    let a = principal("a@EXAMPLE.COM");
    let checker = checker_with(&[a.clone()], Some(&[]));

    let outcome = checker.check(&[a], SECRET, true).unwrap();
    assert_eq!(
        outcome.reason(),
        Some("Secret 'web-keytab' does not exist")
    );
}

#[test]
fn fails_on_the_first_principal_missing_from_the_keytab() {
    let a = principal("a@EXAMPLE.COM");
    let b = principal("b@EXAMPLE.COM");
    let c = principal("c@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&a, 18, &[0xaa])]);
    let checker = checker_with(&[a.clone(), b.clone(), c.clone()], Some(&keytab));

    let outcome = checker.check(&[a, c, b], SECRET, true).unwrap();
    assert!(!outcome.is_pass());
    assert_eq!(
        outcome.reason(),
        Some("Principal 'c@EXAMPLE.COM' does not exist in keytab")
    );
}

#[test]
fn instances_are_part_of_the_keytab_lookup() {
    let bare = principal("HTTP@EXAMPLE.COM");
    let host = principal("HTTP/web.example.com@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&host, 18, &[0xaa])]);
    let checker = checker_with(&[bare.clone()], Some(&keytab));

    let outcome = checker.check(&[bare], SECRET, true).unwrap();
    assert_eq!(
        outcome.reason(),
        Some("Principal 'HTTP@EXAMPLE.COM' does not exist in keytab")
    );
}

#[test]
fn malformed_keytab_is_an_error() {
    let a = principal("a@EXAMPLE.COM");
    let checker = checker_with(&[a.clone()], Some(&[0x05, 0x02, 0x00]));

    let err = checker.check(&[a], SECRET, true).unwrap_err();
    assert!(matches!(err, CheckError::MalformedKeytab { .. }), "{err:?}");
}

#[test]
fn undecodable_text_secret_is_an_error() {
    let a = principal("a@EXAMPLE.COM");
    let secrets = MemorySecretStore::new();
    secrets
        .insert_raw(SECRET, b"not base64!".to_vec())
        .unwrap();
    let checker = Checker::new(MemoryKdc::with_principals([&a]), secrets);

    let err = checker.check(&[a], SECRET, false).unwrap_err();
    assert!(matches!(err, CheckError::SecretStore { .. }), "{err:?}");
}

#[test]
fn empty_principal_list_is_rejected() {
    let checker = checker_with(&[], None);
    assert!(matches!(
        checker.check(&[], SECRET, true),
        Err(CheckError::EmptyPrincipalList)
    ));
    assert!(matches!(
        checker.provision(&[], SECRET, true),
        Err(CheckError::EmptyPrincipalList)
    ));
}

#[test]
fn kdc_failures_are_errors() {
    let checker = Checker::new(UnreachableKdc, MemorySecretStore::new());

    let err = checker
        .check(&[principal("a@EXAMPLE.COM")], SECRET, true)
        .unwrap_err();
    assert!(matches!(err, CheckError::Kdc { .. }), "{err:?}");
    assert!(err.to_string().contains("a@EXAMPLE.COM"));

    let err = checker.list("*", None, true).unwrap_err();
    assert!(matches!(err, CheckError::Kdc { .. }), "{err:?}");
}

#[test]
fn lists_every_matching_principal_without_a_secret() {
    let c = principal("c@EXAMPLE.COM");
    let a = principal("a@EXAMPLE.COM");
    let host = principal("host/a.example.com@EXAMPLE.COM");
    let checker = checker_with(&[c.clone(), a.clone(), host.clone()], None);

    let listing = checker.list("*", None, true).unwrap();
    assert_eq!(listing.principals, vec![a.clone(), c, host.clone()]);
    assert_eq!(listing.checksum, None);

    let listing = checker.list("host/*", None, true).unwrap();
    assert_eq!(listing.principals, vec![host]);
}

#[test]
fn lists_only_principals_in_the_secret() {
    let a = principal("a@EXAMPLE.COM");
    let b = principal("b@EXAMPLE.COM");
    let keytab = keytab_bytes(vec![entry(&a, 18, &[0xaa]), entry(&a, 17, &[0xbb])]);
    let checker = checker_with(&[a.clone(), b], Some(&keytab));

    let listing = checker.list("", Some(SECRET), true).unwrap();
    assert_eq!(listing.principals, vec![a]);
    assert_eq!(listing.checksum.as_deref(), Some(CHECKSUM_A));
}

#[test]
fn listing_with_an_absent_secret_is_an_error() {
    let checker = checker_with(&[principal("a@EXAMPLE.COM")], None);

    let err = checker.list("*", Some(SECRET), true).unwrap_err();
    assert!(matches!(err, CheckError::SecretNotFound(ref name) if name == SECRET));
}

#[test]
fn provisioned_principals_pass_the_check() {
    let a = principal("HTTP/web.example.com@EXAMPLE.COM");
    let b = principal("b@EXAMPLE.COM");
    let checker = Checker::new(MemoryKdc::new(), MemorySecretStore::new());

    checker.provision(&[a.clone(), b.clone()], SECRET, false).unwrap();
    let outcome = checker.check(&[b.clone(), a.clone()], SECRET, false).unwrap();
    assert!(outcome.is_pass(), "{outcome:?}");

    let keytab = checker.secret_store().load(SECRET, false).unwrap().unwrap();
    assert_eq!(
        outcome.checksum(),
        Some(keytab_checksum(&keytab, &[a, b]).unwrap().as_str())
    );
}

#[test]
fn revoked_principals_fail_the_check() {
    let a = principal("a@EXAMPLE.COM");
    let checker = Checker::new(MemoryKdc::new(), MemorySecretStore::new());
    checker.provision(&[a.clone()], SECRET, true).unwrap();

    checker.revoke(&[a.clone()], SECRET, true).unwrap();
    assert!(!checker.kdc().has_principal(&a).unwrap());
    assert_eq!(checker.secret_store().load(SECRET, true).unwrap(), None);
    assert_eq!(
        checker.check(&[a], SECRET, true).unwrap().reason(),
        Some("Principal 'a@EXAMPLE.COM' does not exist in kerberos")
    );
}
