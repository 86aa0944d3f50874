use dialoguer::{Input, Select};
use ripple_core::ChangeKind;
use ripple_operations::OperationError;
use ripple_operations::operations::ChangePrompter;

/// Terminal prompts for the `change` command.
pub struct TerminalPrompter;

const OFFERED_KINDS: [ChangeKind; 5] = [
    ChangeKind::Patch,
    ChangeKind::Minor,
    ChangeKind::Major,
    ChangeKind::Prerelease,
    ChangeKind::None,
];

impl ChangePrompter for TerminalPrompter {
    fn select_kind(
        &self,
        package: &str,
        disallowed: &[ChangeKind],
    ) -> ripple_operations::Result<ChangeKind> {
        let kinds: Vec<ChangeKind> = OFFERED_KINDS
            .into_iter()
            .filter(|kind| *kind == ChangeKind::None || !disallowed.contains(kind))
            .collect();
        let labels: Vec<String> = kinds.iter().map(ToString::to_string).collect();

        let selection = Select::new()
            .with_prompt(format!("Change type for {package}"))
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|_| OperationError::MissingKind {
                name: package.to_string(),
            })?;
        Ok(kinds[selection])
    }

    fn input_comment(&self, package: &str) -> ripple_operations::Result<String> {
        Input::new()
            .with_prompt(format!("Describe the change to {package}"))
            .interact_text()
            .map_err(|_| OperationError::MissingComment)
    }
}
