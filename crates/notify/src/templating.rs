//! Minijinja template rendering for alert messages.
//!
//! Templates are arbitrary strings (built-in defaults or operator
//! overrides), so a fresh [`minijinja::Environment`] is created per
//! render call.

use crate::traits::NotifyError;

/// Urgent-push message used when no override is configured.
pub const DEFAULT_PUSH_TEMPLATE: &str = "{% if test %}[TEST] {% endif %}🚨 KEYWORD ALARM 🚨\n\
'{{ keyword }}' count is {{ count }} (>= {{ threshold }}) on {{ board }} catalog.\n\
Time: {{ now }}\n\
Check {{ board }} catalog immediately.";

/// Chat message used when no override is configured.
pub const DEFAULT_CHAT_TEMPLATE: &str = "{% if test %}[TEST] {% endif %}ALERT: \
'{{ keyword }}' count is {{ count }} (>= {{ threshold }}) on {{ board }} catalog.\n\
Time: {{ now }}\n\
Source: {{ source_url }}";

/// Context data available to alert templates.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlertContext {
    /// Configured keyword, as the operator wrote it.
    pub keyword: String,
    /// Occurrences found in this run.
    pub count: u64,
    pub threshold: u64,
    /// Board label derived from the catalog URL (e.g. `/pol/`).
    pub board: String,
    pub source_url: String,
    /// Invocation time, formatted `%Y-%m-%d %H:%M UTC`.
    pub now: String,
    /// Marks connectivity tests so recipients can tell them apart.
    pub test: bool,
}

impl AlertContext {
    /// Sample alert used by [`Notifier::test`](crate::Notifier::test).
    pub fn test_sample() -> Self {
        Self {
            keyword: "test".to_string(),
            count: 0,
            threshold: 0,
            board: "test".to_string(),
            source_url: "-".to_string(),
            now: "-".to_string(),
            test: true,
        }
    }
}

/// Renders alert templates using minijinja.
#[derive(Debug)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env
    }

    /// Render a template string with the given alert context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// references an unknown variable.
    pub fn render(&self, template_str: &str, ctx: &AlertContext) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Validate that a template string parses without errors.
    ///
    /// This does not evaluate the template — it only checks syntax.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
