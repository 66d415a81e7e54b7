//! Tests for configuration loading and environment precedence

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::errors::ConfigError;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        for name in [
            ENV_IMAGE,
            ENV_TIMEOUT,
            ENV_INTERPRETER,
            ENV_WORKING_DIR,
            ENV_PULL_IMAGE,
            ENV_STAGING_DIR,
        ] {
            env::remove_var(name);
        }
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.image, "python:3.9-slim");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.interpreter, "python");
        assert_eq!(config.working_dir, "/tmp");
        assert_eq!(config.script_suffix, ".py");
        assert!(config.pull_missing_image);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = RunnerConfig::default();
        let lookup = lookup_from(&[
            (ENV_IMAGE, "python:3.12-alpine"),
            (ENV_TIMEOUT, "5"),
            (ENV_PULL_IMAGE, "no"),
        ]);
        ConfigLoader::apply_env_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.image, "python:3.12-alpine");
        assert_eq!(config.timeout, 5);
        assert!(!config.pull_missing_image);
        assert_eq!(config.interpreter, "python");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = RunnerConfig::default();
        let lookup = lookup_from(&[(ENV_IMAGE, "   "), (ENV_TIMEOUT, "")]);
        ConfigLoader::apply_env_overrides(&mut config, lookup).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_invalid_timeout_env() {
        let mut config = RunnerConfig::default();
        let lookup = lookup_from(&[(ENV_TIMEOUT, "thirty")]);
        let err = ConfigLoader::apply_env_overrides(&mut config, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref name, .. } if name == ENV_TIMEOUT));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = RunnerConfig { timeout: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = RunnerConfig { image: "".to_string(), ..Default::default() };
        assert!(config.validate().is_err());

        let config = RunnerConfig { working_dir: "relative".to_string(), ..Default::default() };
        assert!(config.validate().is_err());

        let config = RunnerConfig {
            staging_dir: Some("/definitely/not/here".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_yaml_partial_config_keeps_defaults() {
        clear_env();
        let config = ConfigLoader::from_str("image: python:3.11-slim\ntimeout: 10\n").unwrap();
        assert_eq!(config.image, "python:3.11-slim");
        assert_eq!(config.timeout, 10);
        assert_eq!(config.working_dir, "/tmp");
    }

    #[test]
    #[serial]
    fn test_env_wins_over_yaml() {
        clear_env();
        env::set_var(ENV_TIMEOUT, "7");
        let result = ConfigLoader::from_str("timeout: 10\n");
        clear_env();

        assert_eq!(result.unwrap().timeout, 7);
    }

    #[tokio::test]
    #[serial]
    async fn test_load_config_from_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "image: python:3.10-slim").unwrap();
        writeln!(file, "interpreter: python3").unwrap();
        writeln!(file, "pull_missing_image: false").unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.image, "python:3.10-slim");
        assert_eq!(config.interpreter, "python3");
        assert!(!config.pull_missing_image);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let err = load_config("/no/such/coderunner.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    #[serial]
    fn test_container_removal_cannot_be_disabled() {
        clear_env();
        let err = ConfigLoader::from_str("remove_on_exit: false\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    #[serial]
    fn test_malformed_yaml() {
        clear_env();
        let err = ConfigLoader::from_str("timeout: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
