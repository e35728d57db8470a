// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

// Tests of expected behaviour when running the pem-inspect binary.
#[cfg(test)]
mod tests {
    use std::fs;
    use std::process::Command;

    use assert_cmd::prelude::CommandCargoExt;
    use tempfile::TempDir;

    use pem_client::inspect::NO_PRIVATE_KEYS_TEXT;
    use pem_client::passphrase::{ENV_PASSPHRASE_WARNING, KEY_PASSPHRASE_ENV_VAR};
    use pem_content::test_helpers::{
        fixture_path, fixtures_dir, FIXTURE_PASSWORD, SERVER_COMMON_NAME,
    };

    fn inspect() -> Command {
        let mut command = Command::cargo_bin("pem-inspect").unwrap();
        command.env_remove(KEY_PASSPHRASE_ENV_VAR);
        command
    }

    #[test]
    fn error_if_no_subcommand_provided() {
        let output = inspect().output().unwrap();
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    }

    #[test]
    fn error_on_unknown_format() {
        let output = inspect()
            .args(["certificates", "--format", "json-full"])
            .arg(fixture_path("server.crt"))
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("plain-digest"));
    }

    #[test]
    fn can_list_certificates_from_a_path() {
        let output = inspect()
            .arg("certificates")
            .arg(fixture_path("chain.crt"))
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains(SERVER_COMMON_NAME));
        assert_eq!(stdout.matches("Certificate\n").count(), 2);
    }

    #[test]
    fn can_list_certificates_from_classpath_as_json() {
        let output = inspect()
            .args(["--format", "json-digest", "--resource-root"])
            .arg(fixtures_dir())
            .args(["certificates", "classpath:ca.crt"])
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.trim_start().starts_with('['));
        assert!(stdout.contains("\"serial_number\""));
    }

    #[test]
    fn missing_file_is_reported_on_stderr() {
        let output = inspect()
            .args(["certificates", "/nonexistent/server.crt"])
            .output()
            .unwrap();
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("/nonexistent/server.crt"));
    }

    #[test]
    fn decrypts_key_with_passphrase_from_env() {
        let output = inspect()
            .env(KEY_PASSPHRASE_ENV_VAR, FIXTURE_PASSWORD)
            .args(["keys", "--password-from-env"])
            .arg(fixture_path("ec-pkcs8-encrypted.key"))
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stdout.contains("EC"));
        assert!(stderr.contains(ENV_PASSPHRASE_WARNING));
    }

    #[test]
    fn missing_passphrase_env_var_is_reported() {
        let output = inspect()
            .args(["keys", "--password-from-env"])
            .arg(fixture_path("ec-pkcs8-encrypted.key"))
            .output()
            .unwrap();
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains(KEY_PASSPHRASE_ENV_VAR));
    }

    #[test]
    fn reports_absence_of_keys() {
        let output = inspect()
            .arg("keys")
            .arg(fixture_path("ca.crt"))
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.trim(), NO_PRIVATE_KEYS_TEXT);
    }

    #[test]
    fn can_summarise_a_store() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("store.toml");
        fs::write(
            &config_path,
            format!(
                "certificate = {:?}\nprivate_key = {:?}\nprivate_key_password = {:?}\n",
                fixture_path("server.crt"),
                fixture_path("rsa-pkcs8-encrypted.key"),
                FIXTURE_PASSWORD
            ),
        )
        .unwrap();

        let output = inspect().arg("store").arg(&config_path).output().unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains(SERVER_COMMON_NAME));
        assert!(stdout.contains("Private key:\n    RSA"));
    }
}
