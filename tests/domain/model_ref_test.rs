use rvc_server::domain::{ArtifactLocator, CacheKey, ModelRef};

#[test]
fn given_locator_ref_when_asking_source_then_returns_locator() {
    let locator = ArtifactLocator::new("https://models.example.com/a.zip");
    let model = ModelRef::Locator(locator.clone());

    assert_eq!(model.source(), Some(locator.clone()));
    assert_eq!(model.cache_key(), CacheKey::from_locator(&locator));
}

#[test]
fn given_cached_ref_with_fallback_when_asking_source_then_returns_fallback_under_given_key() {
    let key = CacheKey::parse("custom-key").unwrap();
    let fallback = ArtifactLocator::new("https://models.example.com/a.zip");
    let model = ModelRef::Cached {
        key: key.clone(),
        fallback: Some(fallback.clone()),
    };

    assert_eq!(model.source(), Some(fallback));
    assert_eq!(model.cache_key(), key);
}

#[test]
fn given_reversible_cached_key_without_fallback_when_asking_source_then_decodes_locator() {
    let locator = ArtifactLocator::new("https://models.example.com/a.zip");
    let model = ModelRef::Cached {
        key: CacheKey::from_locator(&locator),
        fallback: None,
    };

    assert_eq!(model.source(), Some(locator));
}

#[test]
fn given_opaque_cached_key_without_fallback_when_asking_source_then_none() {
    let model = ModelRef::Cached {
        key: CacheKey::parse("sha256-abcdef").unwrap(),
        fallback: None,
    };

    assert_eq!(model.source(), None);
}
