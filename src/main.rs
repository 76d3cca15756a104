use ciscript::schema::{
    Concurrency, Job, Matrix, PermissionLevel, PermissionScope, Permissions, Step, Strategy,
    Trigger, Workflow,
};

fn main() -> miette::Result<()> {
    let workflow = Workflow::builder("CI")
        .on(Trigger::push().branches(["main"]))
        .on(Trigger::pull_request())
        .permissions(Permissions::scoped().grant(PermissionScope::Contents, PermissionLevel::Read))
        .concurrency(
            Concurrency::group("${{ github.workflow }}-${{ github.ref }}").cancel_in_progress(true),
        )
        .env("CARGO_TERM_COLOR", "always")
        .job(
            "fmt",
            Job::builder()
                .name("Format")
                .runs_on("ubuntu-latest")
                .step(Step::uses("actions/checkout@v4"))
                .step(Step::uses("dtolnay/rust-toolchain@stable").with("components", "rustfmt"))
                .step(Step::run("cargo fmt --all -- --check")),
        )
        .job(
            "clippy",
            Job::builder()
                .name("Clippy")
                .runs_on("ubuntu-latest")
                .step(Step::uses("actions/checkout@v4"))
                .step(Step::uses("dtolnay/rust-toolchain@stable").with("components", "clippy"))
                .step(Step::uses("Swatinem/rust-cache@v2"))
                .step(Step::run("cargo clippy --all-targets -- -D warnings")),
        )
        .job(
            "test",
            Job::builder()
                .name("Test (${{ matrix.os }}, ${{ matrix.toolchain }})")
                .needs(["fmt"])
                .runs_on("${{ matrix.os }}")
                .strategy(
                    Strategy::matrix(
                        Matrix::new()
                            .axis("os", ["ubuntu-latest", "macos-latest"])
                            .axis("toolchain", ["1.85", "stable"]),
                    )
                    .fail_fast(false),
                )
                .step(Step::uses("actions/checkout@v4"))
                .step(
                    Step::uses("dtolnay/rust-toolchain@master")
                        .with("toolchain", "${{ matrix.toolchain }}"),
                )
                .step(Step::uses("Swatinem/rust-cache@v2"))
                .step(Step::run("cargo test --all-targets").name("Run tests")),
        )
        .build();

    ciscript::cli::run(workflow, ".github/workflows/ci.yml")
}
