//! Directive rule sets applied to httpd.conf
//!
//! Order inside each set matters: rules are planned in sequence and later
//! rules see the lines earlier ones added.

use confpatch::{DirectiveRule, Matcher, Placement};
use std::path::Path;

use crate::settings::Settings;

/// Load every `<vhosts_dir>/*.conf`
pub fn vhost_include(vhosts_dir: &Path) -> Vec<DirectiveRule> {
    vec![DirectiveRule::line(
        "vhosts_include",
        format!("Include {}/*.conf", vhosts_dir.display()),
    )]
}

/// Load mod_php, hand `.php` files to it and serve `index.php` first
pub fn php(php_module: &Path) -> Vec<DirectiveRule> {
    vec![
        DirectiveRule::new(
            "php_module",
            Matcher::Contains("LoadModule php".into()),
            [format!("LoadModule php_module {}", php_module.display())],
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

/// Load mod_ssl, include the stock TLS config and point at the certificate
pub fn ssl(ssl_conf: &Path, cert_file: &Path, key_file: &Path) -> Vec<DirectiveRule> {
    vec![
        DirectiveRule::new(
            "ssl_module",
            Matcher::Contains("LoadModule ssl_module".into()),
            ["LoadModule ssl_module lib/httpd/modules/mod_ssl.so"],
        )
        .placed(Placement::Start),
        DirectiveRule::line("ssl_conf", format!("Include {}", ssl_conf.display())),
        DirectiveRule::line(
            "ssl_certificate",
            format!("SSLCertificateFile {}", cert_file.display()),
        ),
        DirectiveRule::line(
            "ssl_certificate_key",
            format!("SSLCertificateKeyFile {}", key_file.display()),
        ),
    ]
}

/// A named rule set, as reported by `doctor`
pub struct RuleSet {
    pub name: &'static str,
    pub rules: Vec<DirectiveRule>,
}

/// Every rule set devhost manages, built from `settings`
pub fn all(settings: &Settings) -> Vec<RuleSet> {
    vec![
        RuleSet {
            name: "virtual hosts",
            rules: vhost_include(&settings.vhosts_dir()),
        },
        RuleSet {
            name: "php",
            rules: php(&settings.php_module()),
        },
        RuleSet {
            name: "ssl",
            rules: ssl(
                &settings.ssl_conf(),
                &settings.cert_file(),
                &settings.key_file(),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use confpatch::{ConfigDocument, Edit, plan};

    #[test]
    fn test_vhost_include_line() {
        let rules = vhost_include(Path::new("/opt/homebrew/etc/httpd/extra/vhosts"));
        assert_eq!(
            rules[0].activation,
            vec!["Include /opt/homebrew/etc/httpd/extra/vhosts/*.conf".to_string()]
        );
    }

    #[test]
    fn test_ssl_on_stock_conf() {
        let settings = Settings::default();
        let rules = ssl(
            &settings.ssl_conf(),
            &settings.cert_file(),
            &settings.key_file(),
        );
        let doc = ConfigDocument::from_lines([
            "Listen 8080",
            "#LoadModule ssl_module lib/httpd/modules/mod_ssl.so",
            "#Include /opt/homebrew/etc/httpd/extra/httpd-ssl.conf",
        ]);

        let plan = plan(&doc, &rules);
        let edits: Vec<_> = plan.edits.iter().map(|e| &e.edit).collect();
        assert!(matches!(edits[0], Edit::Uncomment { index: 1, .. }));
        assert!(matches!(edits[1], Edit::Uncomment { index: 2, .. }));
        assert_eq!(
            edits[2],
            &Edit::InsertAtEnd(vec![
                "SSLCertificateFile /opt/homebrew/etc/httpd/ssl/server.crt".into()
            ])
        );
        assert_eq!(
            edits[3],
            &Edit::InsertAtEnd(vec![
                "SSLCertificateKeyFile /opt/homebrew/etc/httpd/ssl/server.key".into()
            ])
        );
    }

    #[test]
    fn test_php_directory_index_not_fooled_by_stock_index() {
        let rules = php(Path::new("/opt/homebrew/opt/php/lib/httpd/modules/libphp.so"));
        let doc = ConfigDocument::from_lines([
            "<IfModule dir_module>",
            "    DirectoryIndex index.html",
            "</IfModule>",
        ]);
        let plan = plan(&doc, &rules);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.edits[2].rule, "directory_index");
    }

    #[test]
    fn test_all_sets_converge_on_empty_file() {
        let settings = Settings::default();
        let mut doc = ConfigDocument::default();
        for set in all(&settings) {
            plan(&doc, &set.rules).apply_to(&mut doc);
        }
        for set in all(&settings) {
            assert!(plan(&doc, &set.rules).is_empty(), "{} not converged", set.name);
        }
        assert_eq!(
            doc.lines().first().map(String::as_str),
            Some("LoadModule ssl_module lib/httpd/modules/mod_ssl.so")
        );
    }
}
