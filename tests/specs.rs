//! Workspace-level integration tests: drive the real `cidx` binary against
//! real temp-directory trees and stand-in child processes (spec.md §6, §8).

mod helpers;
mod proxy_cli;
