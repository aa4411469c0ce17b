use http_redirect::cli::Cli;
use http_redirect::config::{Config, RuleConfig, Syntax};
use http_redirect::error::SetupError;
use http_redirect::redirect::Redirector;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.bind, None);
    assert_eq!(cfg.port, "80");
    assert_eq!(cfg.max_connections, 16);
    assert_eq!(cfg.buffer_size, 1024);
    assert!(cfg.rules.is_empty());
    assert_eq!(cfg.display_bind(), "*");
}

#[test]
fn test_config_from_yaml() {
    let yaml = r#"
bind: 127.0.0.1
port: "8080"
default_destination: https://example.com/
max_connections: 4
buffer_size: 512
rules:
  - pattern: '^a\.com'
    syntax: extended
    destination: https://a.example/
  - pattern: 'b\(x\|y\)'
    destination: https://b.example/
"#;
    let cfg = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(cfg.bind.as_deref(), Some("127.0.0.1"));
    assert_eq!(cfg.port, "8080");
    assert_eq!(cfg.default_destination, "https://example.com/");
    assert_eq!(cfg.max_connections, 4);
    assert_eq!(cfg.buffer_size, 512);
    assert_eq!(
        cfg.rules,
        vec![
            RuleConfig {
                pattern: r"^a\.com".into(),
                syntax: Syntax::Extended,
                destination: "https://a.example/".into(),
            },
            RuleConfig {
                pattern: r"b\(x\|y\)".into(),
                syntax: Syntax::Basic,
                destination: "https://b.example/".into(),
            },
        ]
    );
    assert!(Redirector::from_config(&cfg).unwrap().is_routing());
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_yaml_partial_uses_defaults() {
    let cfg = Config::from_yaml_str("destination: http://x/\n").unwrap();
    assert_eq!(cfg.default_destination, "http://x/");
    assert_eq!(cfg.port, "80");
    assert!(!Redirector::from_config(&cfg).unwrap().is_routing());
}

#[test]
fn test_config_invalid_yaml() {
    let err = Config::from_yaml_str("port: [1, 2").unwrap_err();
    assert!(matches!(err, SetupError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_config_missing_file() {
    let err = Config::from_file("/nonexistent/http-redirect.yaml").unwrap_err();
    assert!(matches!(err, SetupError::Config(_)));
}

#[test]
fn test_config_validation() {
    let mut cfg = Config::with_destination("http://x/");
    assert!(cfg.validate().is_ok());

    cfg.max_connections = 0;
    assert!(cfg.validate().is_err());
    cfg.max_connections = 1;

    cfg.buffer_size = 4;
    assert!(cfg.validate().is_err());
    cfg.buffer_size = 512;

    cfg.rules.push(RuleConfig {
        pattern: "x".into(),
        syntax: Syntax::Basic,
        destination: String::new(),
    });
    assert!(cfg.validate().is_err());
}

#[test]
fn test_cli_single_destination() {
    let cli = Cli::try_parse_from_args(["http-redirect", "-p", "8080", "http://www.google.com/"]).unwrap();
    let cfg = cli.into_config().unwrap();

    assert_eq!(cfg.port, "8080");
    assert_eq!(cfg.default_destination, "http://www.google.com/");
    assert!(!Redirector::from_config(&cfg).unwrap().is_routing());
}

#[test]
fn test_cli_rules_keep_command_line_order() {
    let cli = Cli::try_parse_from_args([
        "http-redirect",
        "-e",
        "^first",
        "A",
        "--regex",
        "second",
        "B",
        "--eregex",
        "third",
        "C",
        "-b",
        "127.0.0.1",
        "http://default/",
    ])
    .unwrap();
    let cfg = cli.into_config().unwrap();

    let order: Vec<(&str, Syntax, &str)> = cfg
        .rules
        .iter()
        .map(|r| (r.pattern.as_str(), r.syntax, r.destination.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("^first", Syntax::Extended, "A"),
            ("second", Syntax::Basic, "B"),
            ("third", Syntax::Extended, "C"),
        ]
    );
    assert_eq!(cfg.bind.as_deref(), Some("127.0.0.1"));
    assert_eq!(cfg.default_destination, "http://default/");
}

#[test]
fn test_cli_regex_missing_destination() {
    let result = Cli::try_parse_from_args(["http-redirect", "-r", "only-pattern"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_limits_override_defaults() {
    let cli = Cli::try_parse_from_args([
        "http-redirect",
        "--max-connections",
        "2",
        "--buffer-size",
        "64",
        "http://x/",
    ])
    .unwrap();
    let cfg = cli.into_config().unwrap();

    assert_eq!(cfg.max_connections, 2);
    assert_eq!(cfg.buffer_size, 64);
}

#[test]
fn test_cli_file_then_overrides() {
    let path = std::env::temp_dir().join(format!("http-redirect-test-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "port: \"9000\"\ndefault_destination: http://file/\nrules:\n  - pattern: from-file\n    destination: F\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from_args([
        "http-redirect".as_ref(),
        "-c".as_ref(),
        path.as_os_str(),
        "-r".as_ref(),
        "from-cli".as_ref(),
        "C".as_ref(),
        "http://cli/".as_ref(),
    ])
    .unwrap();
    let cfg = cli.into_config().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.port, "9000");
    assert_eq!(cfg.default_destination, "http://cli/");
    let patterns: Vec<&str> = cfg.rules.iter().map(|r| r.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["from-file", "from-cli"]);
}
