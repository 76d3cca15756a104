use serde::Serialize;

use super::ordered::OrderedMap;
use super::value::{BoolOrExpression, Scalar};
use crate::error::{FieldPath, ValidationError};
use crate::text::dedent_script;
use crate::validation::{Validate, check_bool_or_expression, check_min, check_non_empty};

/// Shells GitHub Actions knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Pwsh,
    Python,
    Sh,
    Cmd,
    Powershell,
}

/// What a step does: call an action, or run a script
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepAction {
    Uses {
        uses: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        with: Option<OrderedMap<Scalar>>,
    },
    Run {
        run: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        shell: Option<Shell>,

        #[serde(skip_serializing_if = "Option::is_none", rename = "working-directory")]
        working_directory: Option<String>,
    },
}

/// A single entry in a job's `steps`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "if")]
    pub condition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub action: StepAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<OrderedMap<Scalar>>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "continue-on-error")]
    pub continue_on_error: Option<BoolOrExpression>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "timeout-minutes")]
    pub timeout_minutes: Option<u32>,
}

impl Step {
    fn with_action(action: StepAction) -> Self {
        Self {
            id: None,
            condition: None,
            name: None,
            action,
            env: None,
            continue_on_error: None,
            timeout_minutes: None,
        }
    }

    /// A step that runs an action, e.g. `actions/checkout@v4`
    pub fn uses(action: impl Into<String>) -> Self {
        Self::with_action(StepAction::Uses {
            uses: action.into(),
            with: None,
        })
    }

    /// A step that runs a shell script; multi-line scripts are dedented
    pub fn run(script: impl AsRef<str>) -> Self {
        Self::with_action(StepAction::Run {
            run: dedent_script(script.as_ref()),
            shell: None,
            working_directory: None,
        })
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Expression copied verbatim into `if:`
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Add an action input; ignored for `run` steps
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        if let StepAction::Uses { with, .. } = &mut self.action {
            with.get_or_insert_with(OrderedMap::new)
                .insert(key, value.into());
        }
        self
    }

    /// Set the shell of a `run` step; ignored for `uses` steps
    pub fn shell(mut self, value: Shell) -> Self {
        if let StepAction::Run { shell, .. } = &mut self.action {
            *shell = Some(value);
        }
        self
    }

    /// Set the directory of a `run` step; ignored for `uses` steps
    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        if let StepAction::Run {
            working_directory, ..
        } = &mut self.action
        {
            *working_directory = Some(dir.into());
        }
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.env
            .get_or_insert_with(OrderedMap::new)
            .insert(key, value.into());
        self
    }

    pub fn continue_on_error(mut self, value: impl Into<BoolOrExpression>) -> Self {
        self.continue_on_error = Some(value.into());
        self
    }

    pub fn timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}

impl Validate for Step {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match &self.action {
            StepAction::Uses { uses, .. } => check_non_empty(uses, &path.clone().key("uses"))?,
            StepAction::Run { run, .. } => check_non_empty(run, &path.clone().key("run"))?,
        }
        if let Some(id) = &self.id {
            check_non_empty(id, &path.clone().key("id"))?;
        }
        if let Some(value) = &self.continue_on_error {
            check_bool_or_expression(value, &path.clone().key("continue-on-error"))?;
        }
        if let Some(minutes) = self.timeout_minutes {
            check_min(u64::from(minutes), 1, &path.clone().key("timeout-minutes"))?;
        }
        Ok(())
    }
}
