//! Fixed names used across the library.

/// Name of the optional configuration file looked up in the project root.
pub const CONFIG_FILENAME: &str = "npbuild.json";

/// Environment variable holding the package tool's installation root.
pub const PACKAGE_TOOL_ENV: &str = "NPACKD_CL";

/// File stem of the package tool executable inside its installation root.
pub const PACKAGE_TOOL_EXE: &str = "npackdcl";

/// Exit code the package tool uses on `add` when the package is already installed.
pub const ALREADY_INSTALLED_EXIT_CODE: i32 = 1;
