//! Deterministic planning text used when no generated plan is available.

/// Hybrid checkbox/tag plan used in dry runs and when generation fails.
pub const SCAFFOLD_PLAN: &str = "\
# Development Plan

- [ ] Project Scaffold / Bootstrap
  - [ ] Initialize repository layout and build tooling
  - [ ] Configure formatting, linting and CI
- [ ] Implement core features
- [ ] Integrate external services
- [ ] Testing and QA
- [ ] Documentation and release

<task>Project Scaffold / Bootstrap</task>
<context>Create the repository skeleton, build configuration and CI pipeline so every later task starts from a working baseline.</context>

<task>Implement core features</task>
<subtask>
- [ ] Implement the domain model
- [ ] Implement the main workflows described in the requirements
</subtask>

<task>Testing and QA</task>
<subtask>
- [ ] Cover acceptance criteria with automated tests
- [ ] Run the full test suite in CI
</subtask>
";
