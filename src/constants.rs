pub const EXIT_SUCCESS: i32 = 0;

pub const TAG_REPORT: &str = "testsuites";
pub const TAG_TEST_SUITE: &str = "testsuite";
pub const TAG_TEST_CASE: &str = "testcase";

pub const ATTR_NAME: &str = "name";
pub const ATTR_CLASS: &str = "class";
pub const ATTR_FILE: &str = "file";
pub const ATTR_LINE: &str = "line";
pub const ATTR_TIME: &str = "time";
pub const ATTR_TESTS: &str = "tests";
