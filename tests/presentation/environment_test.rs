use rvc_server::presentation::Environment;
use rvc_server::presentation::config::UnknownEnvironment;

#[test]
fn given_known_names_when_parsing_environment_then_case_is_ignored() {
    assert_eq!(Environment::try_from("LOCAL".to_string()), Ok(Environment::Local));
    assert_eq!(Environment::try_from("test".to_string()), Ok(Environment::Test));
    assert_eq!("production".parse::<Environment>(), Ok(Environment::Prod));
}

#[test]
fn given_unknown_name_when_parsing_environment_then_error_names_it() {
    assert_eq!(
        "staging".parse::<Environment>(),
        Err(UnknownEnvironment("staging".to_string()))
    );
}

#[test]
fn given_environment_when_asking_settings_file_then_uses_lowercase_name() {
    assert_eq!(Environment::Prod.settings_file(), "appsettings.prod");
    assert_eq!(Environment::default(), Environment::Local);
}
