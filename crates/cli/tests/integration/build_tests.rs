//! Build command integration tests.

use predicates::prelude::*;
use serial_test::serial;

use super::common::{INSTALLER, QUAZIP, TestEnv, ZLIB};

#[test]
#[serial]
fn fresh_checkout_builds_everything() {
  let env = TestEnv::new();

  env
    .npbuild_cmd("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete!"));

  let project = env.project();
  assert!(project.join("zlib/libzdll.a").exists());
  assert!(project.join("zlib/libz.dll.a").exists());
  assert!(project.join("QuaZIP/quazip.pro").exists());

  let calls = env.calls();
  let first_make = calls.iter().position(|c| c.starts_with("make")).unwrap();
  let adds = calls.iter().filter(|c| c.starts_with("npackdcl add")).count();
  assert_eq!(adds, 3);
  assert!(calls[..first_make].iter().filter(|c| c.starts_with("npackdcl add")).count() == 3);
  assert!(calls.last().unwrap().starts_with("advinst /build wpmcpp.aip"));
}

#[test]
#[serial]
fn json_report_stays_parseable_when_tools_print() {
  let env = TestEnv::new();
  env.write_tool(
    &env.toolchain().join("mingw/bin/mingw32-make"),
    "make",
    "echo 'gcc -c -O3 adler32.c'\nexit 0",
  );
  env.write_tool(
    &env.toolchain().join("Desktop/Qt/4.7.3/mingw/bin/qmake"),
    "qmake",
    "echo 'Project MESSAGE: release build'\nexit 0",
  );

  let output = env
    .npbuild_cmd("build")
    .arg("--format")
    .arg("json")
    .assert()
    .success()
    .stderr(predicate::str::contains("adler32.c"))
    .get_output()
    .stdout
    .clone();

  let stdout = String::from_utf8(output).unwrap();
  let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  assert!(report["failure"].is_null());
  let steps = report["steps"].as_array().unwrap();
  assert_eq!(steps.len(), 5);
  assert!(steps.iter().all(|s| s["state"] == "succeeded"));
  assert!(report["elapsed_ms"].is_u64());
}

#[test]
#[serial]
fn second_build_skips_fetched_libraries() {
  let env = TestEnv::new();
  env.npbuild_cmd("build").assert().success();
  std::fs::remove_file(env.log()).unwrap();

  env.npbuild_cmd("build").assert().success();

  let calls = env.calls();
  assert!(!calls.iter().any(|c| c.contains(&format!("path --package={}", ZLIB))));
  assert!(!calls.iter().any(|c| c.contains(&format!("path --package={}", QUAZIP))));
  assert!(!calls.iter().any(|c| c.starts_with("make -f win32/Makefile.gcc")));
}

#[test]
#[serial]
fn missing_installer_fails_packaging_step() {
  let env = TestEnv::new();
  env.write_package_tool(&[ZLIB, QUAZIP]);

  env
    .npbuild_cmd("build")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("step 'msi' failed"))
    .stderr(predicate::str::contains(INSTALLER));

  assert!(!env.calls().iter().any(|c| c.starts_with("advinst")));
  assert!(env.project().join("QuaZIP").exists());
}

#[test]
#[serial]
fn failing_compile_stops_the_build() {
  let env = TestEnv::new();
  env.write_tool(
    &env.toolchain().join("Desktop/Qt/4.7.3/mingw/bin/qmake"),
    "qmake",
    "case \"$1\" in npackdcl.pro) exit 2 ;; esac\nexit 0",
  );

  env
    .npbuild_cmd("build")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("step 'npackdcl' failed"));

  let calls = env.calls();
  assert!(calls.iter().any(|c| c.starts_with("qmake wpmcpp.pro")));
  assert!(!calls.iter().any(|c| c.starts_with("advinst")));
}

#[test]
#[serial]
fn missing_package_tool_stops_before_steps() {
  let env = TestEnv::new();

  env
    .npbuild_cmd("build")
    .env_remove("NPACKD_CL")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("NPACKD_CL"));

  assert!(env.calls().is_empty());
  assert!(!env.project().join("zlib").exists());
}

#[test]
#[serial]
fn check_passes_with_scripted_tools() {
  let env = TestEnv::new();

  env
    .npbuild_cmd("check")
    .assert()
    .success()
    .stdout(predicate::str::contains("Ready to build"))
    .stdout(predicate::str::contains(env.packages().join("zlib").display().to_string()))
    .stdout(predicate::str::contains(INSTALLER));

  assert!(env.calls().iter().all(|c| !c.starts_with("npackdcl add")));
}

#[test]
#[serial]
fn check_json_lists_package_locations() {
  let env = TestEnv::new();
  env.write_package_tool(&[ZLIB]);

  let output = env
    .npbuild_cmd("check")
    .arg("--format")
    .arg("json")
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
  assert_eq!(report["ok"], true);
  let packages = report["packages"].as_array().unwrap();
  assert_eq!(packages.len(), 3);
  let zlib = packages.iter().find(|p| p["id"] == ZLIB).unwrap();
  assert!(zlib["path"].is_string());
  let quazip = packages.iter().find(|p| p["id"] == QUAZIP).unwrap();
  assert!(quazip["path"].is_null());
}
