//! Binary-level tests for `wpack build`.

use predicates::prelude::*;

use crate::common::{CliProject, file_inventory};

/// Building outside a wpack project fails before touching the filesystem.
#[test]
fn build_without_config_fails_cleanly() {
    let project = CliProject::new().unwrap();

    project
        .run_wpack(&["build"])
        .failure()
        .stderr(predicate::str::contains("wpack.toml not found"));

    assert!(!project.path("dist").exists());
}

/// An enabled prefixer without a prefix fails in `Validating`, leaving no
/// output directory behind.
#[test]
fn missing_namespace_prefix_fails_validation() {
    let project = CliProject::new().unwrap();
    project
        .write_file(
            "wpack.toml",
            "plugin_id = \"acme-app\"\n[build.prefixer]\nenabled = true\n",
        )
        .unwrap();

    project
        .run_wpack(&["build"])
        .failure()
        .stderr(predicate::str::contains("namespace_prefix"));

    assert!(!project.path("dist").exists());
}

/// An empty plugin id is rejected the same way.
#[test]
fn empty_plugin_id_fails_validation() {
    let project = CliProject::new().unwrap();
    project.write_file("wpack.toml", "plugin_id = \"\"\n").unwrap();

    project
        .run_wpack(&["build"])
        .failure()
        .stderr(predicate::str::contains("plugin_id"));

    assert!(!project.path("dist").exists());
}

/// A project without dependencies builds to an unmodified copy of the
/// source tree plus a zip.
#[test]
fn no_dependency_build_produces_folder_and_zip() {
    let project = CliProject::new().unwrap();
    project.scaffold_basic("acme-app").unwrap();

    project
        .run_wpack(&["build"])
        .success()
        .stdout(predicate::str::contains("Build completed successfully!"));

    // Unmodified copies of the sources
    let copied = project.read_file("dist/acme-app/src/Plugin.php").unwrap();
    let original = project.read_file("src/Plugin.php").unwrap();
    assert_eq!(copied, original);
    assert_eq!(
        project.read_file("dist/acme-app/acme-app.php").unwrap(),
        project.read_file("acme-app.php").unwrap()
    );
    assert_eq!(
        project.read_file("dist/acme-app/README.md").unwrap(),
        project.read_file("README.md").unwrap()
    );

    // The archive exists and is non-trivial
    let zip_len = std::fs::metadata(project.path("dist/acme-app.zip")).unwrap().len();
    assert!(zip_len > 0);
}

/// Two consecutive runs of the same build yield identical output trees.
#[test]
fn rebuilding_is_idempotent() {
    let project = CliProject::new().unwrap();
    project.scaffold_basic("acme-app").unwrap();

    project.run_wpack(&["build"]).success();
    let first = file_inventory(&project.path("dist/acme-app"));
    let first_contents: Vec<String> = first
        .iter()
        .map(|p| project.read_file(&format!("dist/acme-app/{}", p.display())).unwrap())
        .collect();

    project.run_wpack(&["build"]).success();
    let second = file_inventory(&project.path("dist/acme-app"));
    let second_contents: Vec<String> = second
        .iter()
        .map(|p| project.read_file(&format!("dist/acme-app/{}", p.display())).unwrap())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first_contents, second_contents);
}

/// `--quiet` suppresses progress output entirely.
#[test]
fn quiet_build_prints_nothing() {
    let project = CliProject::new().unwrap();
    project.scaffold_basic("acme-app").unwrap();

    project.run_wpack(&["--quiet", "build"]).success().stdout(predicate::str::is_empty());
}

/// Full end-to-end run against a stubbed Composer: dependencies get
/// materialized, prefixed, and the autoloader metadata rewritten.
#[cfg(unix)]
#[test]
fn stubbed_composer_build_prefixes_vendor_namespaces() {
    use std::os::unix::fs::PermissionsExt;

    let project = CliProject::new().unwrap();
    project
        .write_file(
            "wpack.toml",
            concat!(
                "plugin_id = \"acme-app\"\n",
                "[build.prefixer]\n",
                "enabled = true\n",
                "namespace_prefix = \"AcmeApp\"\n",
            ),
        )
        .unwrap();
    project
        .write_file(
            "composer.json",
            r#"{ "require": { "acme/lib": "^1.0" }, "require-dev": { "phpunit/phpunit": "^10" } }"#,
        )
        .unwrap();
    project
        .write_file(
            "src/Bootstrap.php",
            "<?php\n\nnamespace AcmeApp;\n\nuse Acme\\Lib\\Client;\n\nclass Bootstrap\n{\n}\n",
        )
        .unwrap();
    project.write_file("acme-app.php", "<?php\nuse Acme\\Lib\\Client;\n").unwrap();

    // Stub composer: materializes a small vendor tree and exits 0. Heredocs
    // are quoted, so the PHP backslashes pass through untouched.
    let stub = r##"#!/bin/sh
echo "Installing dependencies (stub)"
mkdir -p vendor/acme/lib/src
cat > vendor/acme/lib/composer.json <<'JSON'
{ "name": "acme/lib", "autoload": { "psr-4": { "Acme\\Lib\\": "src/" } } }
JSON
cat > vendor/acme/lib/src/Client.php <<'PHP'
<?php

namespace Acme\Lib;

use Acme\Lib\Support\Options;

class Client
{
}
PHP
mkdir -p vendor/composer
cat > vendor/composer/installed.json <<'JSON'
{ "packages": [ { "name": "acme/lib" } ] }
JSON
cat > vendor/composer/autoload_psr4.php <<'PHP'
<?php
$vendorDir = dirname(__DIR__);
return array(
    'Acme\\Lib\\' => array($vendorDir . '/acme/lib/src'),
);
PHP
exit 0
"##;
    project.write_file("composer-stub.sh", stub).unwrap();
    let stub_path = project.path("composer-stub.sh");
    let mut perms = std::fs::metadata(&stub_path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&stub_path, perms).unwrap();

    project
        .run_wpack_with_env(&["build"], "WPACK_COMPOSER", &stub_path.display().to_string())
        .success()
        .stdout(predicate::str::contains("Processed vendor package: acme/lib"));

    // Vendor source moved under the prefix, declarations and imports alike
    let client = project.read_file("dist/acme-app/vendor/acme/lib/src/Client.php").unwrap();
    assert!(client.contains("namespace AcmeApp\\Acme\\Lib;"));
    assert!(client.contains("use AcmeApp\\Acme\\Lib\\Support\\Options;"));
    assert!(!client.contains("namespace Acme\\Lib;"));

    // First-party code had its imports updated, its own namespace kept
    let bootstrap = project.read_file("dist/acme-app/src/Bootstrap.php").unwrap();
    assert!(bootstrap.contains("namespace AcmeApp;"));
    assert!(bootstrap.contains("use AcmeApp\\Acme\\Lib\\Client;"));

    // Entry file is reference-rewritten too
    let entry = project.read_file("dist/acme-app/acme-app.php").unwrap();
    assert!(entry.contains("use AcmeApp\\Acme\\Lib\\Client;"));

    // Autoloader metadata keys carry the prefix in their escaped spelling
    let psr4 = project.read_file("dist/acme-app/vendor/composer/autoload_psr4.php").unwrap();
    assert!(psr4.contains(r"'AcmeApp\\Acme\\Lib\\' => array("));

    // composer_cleanup defaults to true: no manifest in the distributable
    assert!(!project.path("dist/acme-app/composer.json").exists());
    assert!(project.path("dist/acme-app.zip").is_file());
}

/// A failing installer aborts the build with a failure exit code and leaves
/// the partial tree in place for inspection.
#[cfg(unix)]
#[test]
fn failing_installer_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let project = CliProject::new().unwrap();
    project.write_file("wpack.toml", "plugin_id = \"acme-app\"\n").unwrap();
    project.write_file("composer.json", r#"{ "require": { "acme/lib": "^1.0" } }"#).unwrap();

    let stub = "#!/bin/sh\necho \"simulated failure\" >&2\nexit 1\n";
    project.write_file("composer-stub.sh", stub).unwrap();
    let stub_path = project.path("composer-stub.sh");
    let mut perms = std::fs::metadata(&stub_path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&stub_path, perms).unwrap();

    project
        .run_wpack_with_env(&["build"], "WPACK_COMPOSER", &stub_path.display().to_string())
        .failure()
        .stderr(predicate::str::contains("dependency installation failed"));

    // Partial output is intentionally preserved
    assert!(project.path("dist/acme-app").is_dir());
}
