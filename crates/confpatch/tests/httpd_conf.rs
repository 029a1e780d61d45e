//! Rule sets applied to a realistic httpd.conf

use confpatch::{DirectiveRule, Executor, Matcher, Placement, RunMode};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HTTPD_CONF: &str = r#"ServerRoot "/opt/homebrew/opt/httpd"
Listen 8080
LoadModule mpm_prefork_module lib/httpd/modules/mod_mpm_prefork.so
LoadModule authz_core_module lib/httpd/modules/mod_authz_core.so
#LoadModule socache_shmcb_module lib/httpd/modules/mod_socache_shmcb.so
LoadModule dir_module lib/httpd/modules/mod_dir.so
#LoadModule rewrite_module lib/httpd/modules/mod_rewrite.so

ServerAdmin you@example.com
DocumentRoot "/opt/homebrew/var/www"

<IfModule dir_module>
    DirectoryIndex index.html
</IfModule>

# Secure (SSL/TLS) connections
#Include /opt/homebrew/etc/httpd/extra/httpd-ssl.conf
"#;

const SSL_CONF: &str = "/opt/homebrew/etc/httpd/extra/httpd-ssl.conf";
const CERT: &str = "/opt/homebrew/etc/httpd/ssl/server.crt";
const KEY: &str = "/opt/homebrew/etc/httpd/ssl/server.key";

fn ssl_rules() -> Vec<DirectiveRule> {
    vec![
        DirectiveRule::new(
            "ssl_module",
            Matcher::Contains("LoadModule ssl_module".into()),
            ["LoadModule ssl_module lib/httpd/modules/mod_ssl.so"],
        )
        .placed(Placement::Start),
        DirectiveRule::line("ssl_conf", format!("Include {SSL_CONF}")),
        DirectiveRule::line("ssl_cert", format!("SSLCertificateFile {CERT}")),
        DirectiveRule::line("ssl_key", format!("SSLCertificateKeyFile {KEY}")),
    ]
}

fn php_rules() -> Vec<DirectiveRule> {
    vec![
        DirectiveRule::new(
            "php_module",
            Matcher::Contains("LoadModule php".into()),
            ["LoadModule php_module /opt/homebrew/opt/php/lib/httpd/modules/libphp.so"],
        )
        .placed(Placement::Start),
        DirectiveRule::new(
            "php_handler",
            Matcher::Contains("SetHandler application/x-httpd-php".into()),
            [
                "<FilesMatch \\.php$>",
                "    SetHandler application/x-httpd-php",
                "</FilesMatch>",
            ],
        ),
        DirectiveRule::new(
            "directory_index",
            Matcher::Contains("DirectoryIndex index.php".into()),
            [
                "<IfModule dir_module>",
                "    DirectoryIndex index.php index.html",
                "</IfModule>",
            ],
        ),
    ]
}

fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("httpd.conf");
    fs::write(&path, HTTPD_CONF).unwrap();
    (dir, path)
}

fn count(path: &Path, needle: &str) -> usize {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| l.contains(needle) && !l.starts_with('#'))
        .count()
}

#[test]
fn enabling_ssl_twice_adds_each_directive_once() {
    let (_dir, path) = fixture();
    let executor = Executor::new(RunMode::Real);

    let first = executor.apply(&path, &ssl_rules()).unwrap();
    assert!(first.changed);
    let after_first = fs::read(&path).unwrap();

    let second = executor.apply(&path, &ssl_rules()).unwrap();
    assert!(!second.changed);
    assert_eq!(fs::read(&path).unwrap(), after_first);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content.lines().next(),
        Some("LoadModule ssl_module lib/httpd/modules/mod_ssl.so")
    );
    assert_eq!(count(&path, "LoadModule ssl_module"), 1);
    assert_eq!(count(&path, &format!("Include {SSL_CONF}")), 1);
    assert_eq!(count(&path, &format!("SSLCertificateFile {CERT}")), 1);
    assert_eq!(count(&path, &format!("SSLCertificateKeyFile {KEY}")), 1);
}

#[test]
fn commented_ssl_include_is_activated_in_place() {
    let (_dir, path) = fixture();
    let original_len = HTTPD_CONF.lines().count();

    Executor::new(RunMode::Real)
        .apply(&path, &ssl_rules()[1..2])
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), original_len);
    assert_eq!(content.lines().last(), Some(format!("Include {SSL_CONF}").as_str()));
    assert!(!content.contains(&format!("#Include {SSL_CONF}")));
}

#[test]
fn commented_module_is_activated_without_insertion() {
    let (_dir, path) = fixture();
    let rewrite = DirectiveRule::new(
        "rewrite_module",
        Matcher::Contains("LoadModule rewrite_module".into()),
        ["LoadModule rewrite_module lib/httpd/modules/mod_rewrite.so"],
    )
    .placed(Placement::Start);

    Executor::new(RunMode::Real).apply(&path, &[rewrite]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), HTTPD_CONF.lines().count());
    assert!(content.contains("\nLoadModule rewrite_module lib/httpd/modules/mod_rewrite.so\n"));
    assert!(content.starts_with("ServerRoot"));
}

#[test]
fn php_rules_apply_in_declared_order() {
    let (_dir, path) = fixture();
    let outcome = Executor::new(RunMode::Real).apply(&path, &php_rules()).unwrap();

    let names: Vec<_> = outcome.plan.edits.iter().map(|e| e.rule.as_str()).collect();
    assert_eq!(names, ["php_module", "php_handler", "directory_index"]);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
        lines[0],
        "LoadModule php_module /opt/homebrew/opt/php/lib/httpd/modules/libphp.so"
    );
    assert_eq!(
        &lines[lines.len() - 6..],
        &[
            "<FilesMatch \\.php$>",
            "    SetHandler application/x-httpd-php",
            "</FilesMatch>",
            "<IfModule dir_module>",
            "    DirectoryIndex index.php index.html",
            "</IfModule>",
        ]
    );
}

#[test]
fn converged_file_is_stable_across_rule_sets() {
    let (_dir, path) = fixture();
    let executor = Executor::new(RunMode::Real);
    let mut all = php_rules();
    all.extend(ssl_rules());

    executor.apply(&path, &all).unwrap();
    let once = fs::read_to_string(&path).unwrap();

    executor.apply(&path, &php_rules()).unwrap();
    executor.apply(&path, &ssl_rules()).unwrap();
    executor.apply(&path, &all).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), once);
}

#[test]
fn dry_run_leaves_bytes_untouched_whatever_the_rules() {
    let (_dir, path) = fixture();
    let executor = Executor::new(RunMode::DryRun);

    for rules in [ssl_rules(), php_rules(), Vec::new()] {
        executor.apply(&path, &rules).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), HTTPD_CONF);
    }
}

#[test]
fn dry_run_reports_same_change_as_real_run() {
    let (_dir, path) = fixture();

    let preview = Executor::new(RunMode::DryRun)
        .apply(&path, &ssl_rules())
        .unwrap();
    let real = Executor::new(RunMode::Real).apply(&path, &ssl_rules()).unwrap();

    assert_eq!(preview.plan, real.plan);
    assert_eq!(
        preview.preview.unwrap().after,
        fs::read_to_string(&path).unwrap()
    );
}

#[test]
fn latin1_comment_is_kept_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("httpd.conf");
    fs::write(&path, b"# Caf\xe9 config\nListen 80\n").unwrap();

    let outcome = Executor::new(RunMode::Real).apply(&path, &ssl_rules()).unwrap();
    assert!(outcome.changed);

    let bytes = fs::read(&path).unwrap();
    let kept: &[u8] = b"# Caf\xe9 config\nListen 80\n";
    assert!(bytes.windows(kept.len()).any(|w| w == kept));
    assert!(String::from_utf8_lossy(&bytes).contains(&format!("SSLCertificateFile {CERT}")));

    let again = Executor::new(RunMode::Real).apply(&path, &ssl_rules()).unwrap();
    assert!(!again.changed);
    assert_eq!(fs::read(&path).unwrap(), bytes);
}
