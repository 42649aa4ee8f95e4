use super::*;
use yare::parameterized;

#[parameterized(
    start = {"start", CommandClass::Sequential},
    stop = {"stop", CommandClass::Sequential},
    uninstall = {"uninstall", CommandClass::Sequential},
    query = {"query", CommandClass::Query},
    omni_search = {"omni-search", CommandClass::Query},
    watch = {"watch", CommandClass::Watch},
    status = {"status", CommandClass::Parallel},
    fix_config = {"fix-config", CommandClass::Parallel},
)]
fn classifies(command: &str, expected: CommandClass) {
    assert_eq!(classify(command), expected);
}
