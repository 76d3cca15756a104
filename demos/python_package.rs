//! CI/CD for a Poetry-managed Python package
//!
//! Lints and tests across every supported Python release, then publishes to
//! PyPI and tags a GitHub release once both pass.
//!
//! ```sh
//! cargo run --example python_package -- --output python-ci.yml
//! ```
use ciscript::schema::{
    Defaults, Job, JobBuilder, Matrix, Shell, Step, Strategy, Trigger, Workflow,
};

const OLDEST_PYTHON_MINOR: u32 = 7;
const LATEST_PYTHON_MINOR: u32 = 11;

fn python_matrix() -> Strategy {
    let versions = (OLDEST_PYTHON_MINOR..=LATEST_PYTHON_MINOR).map(|minor| format!("3.{minor}"));
    Strategy::matrix(Matrix::new().axis("python-version", versions))
}

fn setup_project() -> Vec<Step> {
    vec![
        Step::uses("actions/checkout@v4"),
        Step::uses("actions/setup-python@v5")
            .name("Set up Python")
            .with("python-version", "${{ matrix.python-version }}"),
        Step::uses("snok/install-poetry@v1").name("Install and configure Poetry"),
        Step::run("make init").name("Setup project"),
    ]
}

fn python_job(name: &str) -> JobBuilder {
    Job::builder()
        .name(name)
        .runs_on("ubuntu-latest")
        .strategy(python_matrix())
        .steps(setup_project())
}

fn main() -> miette::Result<()> {
    let release = Step::run(
        r#"PACKAGE_VERSION=$(poetry version -s)
        echo "package_version=$PACKAGE_VERSION" >> $GITHUB_ENV
        printf "\nSee this release on GitHub: [v$PACKAGE_VERSION](https://github.com/$GITHUB_REPOSITORY/releases/tag/$PACKAGE_VERSION)\n" >> README.md
        poetry config pypi-token.pypi "${{ secrets.PYPI_TOKEN }}"
        poetry publish --build
        "#,
    )
    .name("PyPi release")
    .id("pypi");

    let workflow = Workflow::builder("CI/CD")
        .on(Trigger::pull_request())
        .on(Trigger::push().branches(["main"]))
        .defaults(Defaults::shell(Shell::Bash))
        .job(
            "lint",
            python_job("Run Linters").step(Step::run("make lint").name("Lint")),
        )
        .job(
            "test",
            python_job("Run Tests").step(Step::run("make test").name("Test")),
        )
        .job(
            "pypi",
            python_job("🚀 PyPi Release 📦")
                .needs(["test", "lint"])
                .step(release)
                .step(
                    Step::uses("ncipollo/release-action@v1")
                        .name("GitHub release")
                        .condition("steps.pypi.outcome == 'success'")
                        .with("token", "${{ secrets.GITHUB_TOKEN }}")
                        .with("tag", "${{ env.package_version }}")
                        .with("generateReleaseNotes", true),
                ),
        )
        .build();

    ciscript::cli::run(workflow, "python-package.yml")
}
