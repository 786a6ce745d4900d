//! Library-level pipeline tests with a fake dependency installer.
//!
//! These cover the prefixing flows that would otherwise need a real
//! Composer installation: vendor packages are materialized by
//! [`FakeInstaller`] exactly the way `composer install` would lay them out.

use wpack_cli::archive::ZipBackend;
use wpack_cli::build::{BuildPipeline, BuildState};
use wpack_cli::test_utils::{
    FailingInstaller, FakeInstaller, FakePackage, TestProject, UnavailableBackend,
    init_test_logging,
};

use crate::common::file_inventory;

const LIB_MANIFEST: &str = r#"{
    "name": "acme/lib",
    "autoload": { "psr-4": { "Acme\\Lib\\": "src/" } },
    "require": { "php": ">=8.0", "acme/core": "^1.0" }
}"#;

const CORE_MANIFEST: &str = r#"{
    "name": "acme/core",
    "autoload": { "psr-4": { "Acme\\Core\\": "src/" } }
}"#;

const LIB_SERVICE: &str = r"<?php

namespace Acme\Lib;

use Acme\Core\Contracts\Hasher;
use Acme\Lib\Support\Options as LibOptions;

class Service extends \Acme\Lib\Base\AbstractService
{
    public function boot(): void
    {
        $hasher = new \Acme\Core\Hasher();
        if ($hasher instanceof Acme\Core\Contracts\Hasher) {
            return;
        }
    }
}
";

fn prefixing_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project
        .write_config(
            "plugin_id = \"acme-app\"\n[build.prefixer]\nenabled = true\nnamespace_prefix = \"Vendor_App\"\n",
        )
        .unwrap();
    project
        .write_composer_manifest(r#"{ "require": { "acme/lib": "^1.0", "acme/core": "^1.0" } }"#)
        .unwrap();
    project
        .write_source_file(
            "Plugin.php",
            "<?php\n\nnamespace AcmeApp;\n\nuse Acme\\Lib\\Service;\n\nclass Plugin\n{\n}\n",
        )
        .unwrap();
    project.write_file("acme-app.php", "<?php\nuse Acme\\Lib\\Service;\n").unwrap();
    project
}

fn fake_installer() -> FakeInstaller {
    FakeInstaller::with_packages(vec![
        FakePackage::new("acme/lib", LIB_MANIFEST, &[("src/Service.php", LIB_SERVICE)]),
        FakePackage::new(
            "acme/core",
            CORE_MANIFEST,
            &[("src/Hasher.php", "<?php\n\nnamespace Acme\\Core;\n\nclass Hasher\n{\n}\n")],
        ),
    ])
    .with_metadata_file(
        "autoload_psr4.php",
        r"<?php
$vendorDir = dirname(__DIR__);
$baseDir = dirname($vendorDir);
return array(
    'Acme\\Lib\\' => array($vendorDir . '/acme/lib/src'),
    'Acme\\Core\\' => array($vendorDir . '/acme/core/src'),
    'AcmeApp\\' => array($baseDir . '/src'),
);
",
    )
}

/// The full round trip: a package declaring `Acme\Lib`, built under prefix
/// `Vendor_App`, has every declaration, import, and qualified reference
/// updated while unrelated namespaces stay put.
#[tokio::test]
async fn prefixed_build_rewrites_declarations_imports_and_references() {
    init_test_logging(None);
    let project = prefixing_project();
    let mut pipeline =
        BuildPipeline::new(project.root(), fake_installer(), ZipBackend).quiet(true);
    let outcome = pipeline.run().await.unwrap();
    assert_eq!(pipeline.state(), BuildState::Done);
    assert!(outcome.warnings.is_empty());

    let service = project.read_file("dist/acme-app/vendor/acme/lib/src/Service.php").unwrap();
    assert!(service.contains("namespace Vendor_App\\Acme\\Lib;"));
    assert!(service.contains("use Vendor_App\\Acme\\Core\\Contracts\\Hasher;"));
    assert!(service.contains("use Vendor_App\\Acme\\Lib\\Support\\Options as LibOptions;"));
    assert!(service.contains("extends \\Vendor_App\\Acme\\Lib\\Base\\AbstractService"));
    assert!(service.contains("new \\Vendor_App\\Acme\\Core\\Hasher()"));
    assert!(service.contains("instanceof Vendor_App\\Acme\\Core\\Contracts\\Hasher"));
    assert!(!service.contains("Vendor_App\\Vendor_App"));

    // First-party files keep their own namespace; imports move
    let plugin = project.read_file("dist/acme-app/src/Plugin.php").unwrap();
    assert!(plugin.contains("namespace AcmeApp;"));
    assert!(plugin.contains("use Vendor_App\\Acme\\Lib\\Service;"));

    // Metadata keys move in their escaped spelling; the first-party key stays
    let psr4 = project.read_file("dist/acme-app/vendor/composer/autoload_psr4.php").unwrap();
    assert!(psr4.contains(r"'Vendor_App\\Acme\\Lib\\' =>"));
    assert!(psr4.contains(r"'Vendor_App\\Acme\\Core\\' =>"));
    assert!(psr4.contains(r"'AcmeApp\\' =>"));

    // Cleanup is on by default
    assert!(!project.root().join("dist/acme-app/composer.json").exists());
}

/// Running the pipeline twice on the same inputs yields byte-identical
/// output trees.
#[tokio::test]
async fn prefixed_build_is_idempotent_across_runs() {
    let project = prefixing_project();

    let mut pipeline =
        BuildPipeline::new(project.root(), fake_installer(), ZipBackend).quiet(true);
    pipeline.run().await.unwrap();
    let build_dir = project.root().join("dist/acme-app");
    let first_files = file_inventory(&build_dir);
    let first_contents: Vec<Vec<u8>> =
        first_files.iter().map(|p| std::fs::read(build_dir.join(p)).unwrap()).collect();

    let mut pipeline =
        BuildPipeline::new(project.root(), fake_installer(), ZipBackend).quiet(true);
    pipeline.run().await.unwrap();
    let second_files = file_inventory(&build_dir);
    let second_contents: Vec<Vec<u8>> =
        second_files.iter().map(|p| std::fs::read(build_dir.join(p)).unwrap()).collect();

    assert_eq!(first_files, second_files);
    assert_eq!(first_contents, second_contents);
}

/// With prefixing disabled, vendor packages are bundled untouched.
#[tokio::test]
async fn disabled_prefixer_bundles_vendor_verbatim() {
    let project = TestProject::new().unwrap();
    project.write_config("plugin_id = \"acme-app\"\n").unwrap();
    project
        .write_composer_manifest(r#"{ "require": { "acme/lib": "^1.0" } }"#)
        .unwrap();
    project.write_file("acme-app.php", "<?php\n").unwrap();

    let installer = FakeInstaller::with_packages(vec![FakePackage::new(
        "acme/lib",
        LIB_MANIFEST,
        &[("src/Service.php", LIB_SERVICE)],
    )]);
    let mut pipeline = BuildPipeline::new(project.root(), installer, ZipBackend).quiet(true);
    pipeline.run().await.unwrap();

    let service = project.read_file("dist/acme-app/vendor/acme/lib/src/Service.php").unwrap();
    assert_eq!(service, LIB_SERVICE);
}

/// A failing dependency installer is fatal: the pipeline ends in `Failed`
/// and the partial build tree stays on disk for inspection.
#[tokio::test]
async fn failing_installer_aborts_in_failed_state() {
    init_test_logging(None);
    let project = prefixing_project();
    let mut pipeline =
        BuildPipeline::new(project.root(), FailingInstaller, ZipBackend).quiet(true);
    let err = pipeline.run().await.unwrap_err();

    assert_eq!(pipeline.state(), BuildState::Failed);
    assert!(err.to_string().contains("dependency installation failed"));
    assert!(project.root().join("dist/acme-app").is_dir());
    assert!(!project.root().join("dist/acme-app.zip").exists());
}

/// An unavailable archive backend degrades to folder-only output with a
/// warning, never a failure.
#[tokio::test]
async fn unavailable_archiver_degrades_to_folder_output() {
    let project = prefixing_project();
    let mut pipeline =
        BuildPipeline::new(project.root(), fake_installer(), UnavailableBackend).quiet(true);
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(pipeline.state(), BuildState::Done);
    assert!(outcome.archive.is_none());
    assert!(outcome.warnings.iter().any(|w| w.contains("archive backend")));
    assert!(project.root().join("dist/acme-app/src/Plugin.php").is_file());
    assert!(!project.root().join("dist/acme-app.zip").exists());
}

/// Explicitly scoped packages that are not installed produce a warning and
/// the rest of the build proceeds.
#[tokio::test]
async fn unknown_scope_package_warns_but_builds() {
    let project = TestProject::new().unwrap();
    project
        .write_config(concat!(
            "plugin_id = \"acme-app\"\n",
            "[build.prefixer]\n",
            "enabled = true\n",
            "namespace_prefix = \"Vendor_App\"\n",
            "include_packages = [\"acme/lib\", \"acme/ghost\"]\n",
        ))
        .unwrap();
    project
        .write_composer_manifest(r#"{ "require": { "acme/lib": "^1.0" } }"#)
        .unwrap();
    project.write_file("acme-app.php", "<?php\n").unwrap();

    let installer = FakeInstaller::with_packages(vec![FakePackage::new(
        "acme/lib",
        LIB_MANIFEST,
        &[("src/Service.php", "<?php\nnamespace Acme\\Lib;\n")],
    )]);
    let mut pipeline = BuildPipeline::new(project.root(), installer, ZipBackend).quiet(true);
    let outcome = pipeline.run().await.unwrap();

    assert!(outcome.warnings.iter().any(|w| w.contains("acme/ghost")));
    let service = project.read_file("dist/acme-app/vendor/acme/lib/src/Service.php").unwrap();
    assert!(service.contains("namespace Vendor_App\\Acme\\Lib;"));
}

/// Disabling composer_cleanup keeps the manifest in the build tree.
#[tokio::test]
async fn cleanup_can_be_disabled() {
    let project = TestProject::new().unwrap();
    project
        .write_config("plugin_id = \"acme-app\"\n[build]\ncomposer_cleanup = false\n")
        .unwrap();
    project
        .write_composer_manifest(r#"{ "require": { "acme/lib": "^1.0" } }"#)
        .unwrap();
    project.write_file("acme-app.php", "<?php\n").unwrap();

    let installer = FakeInstaller::with_packages(vec![FakePackage::new(
        "acme/lib",
        LIB_MANIFEST,
        &[],
    )]);
    let mut pipeline = BuildPipeline::new(project.root(), installer, ZipBackend).quiet(true);
    pipeline.run().await.unwrap();

    assert!(project.root().join("dist/acme-app/composer.json").is_file());
}

/// Non-PHP vendor files survive byte-for-byte even in a prefixed build.
#[tokio::test]
async fn non_php_vendor_files_are_untouched() {
    let project = prefixing_project();
    let installer = FakeInstaller::with_packages(vec![FakePackage::new(
        "acme/lib",
        LIB_MANIFEST,
        &[
            ("src/Service.php", LIB_SERVICE),
            ("LICENSE", "Copyright Acme\\Lib authors\n"),
        ],
    )]);
    let mut pipeline = BuildPipeline::new(project.root(), installer, ZipBackend).quiet(true);
    pipeline.run().await.unwrap();
    let license = project.read_file("dist/acme-app/vendor/acme/lib/LICENSE").unwrap();
    assert_eq!(license, "Copyright Acme\\Lib authors\n");
}
