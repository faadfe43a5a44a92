//! Workspace root package. Holds workspace-level tooling such as the
//! pre-commit hooks; the code lives in `crates/`.
