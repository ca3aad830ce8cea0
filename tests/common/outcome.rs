//! Translation of cucumber's scenario result into lifecycle outcomes.

use cucumber::event::ScenarioFinished;
use cucumber::gherkin;
use storefront_e2e::ScenarioOutcome;

/// Outcome handed to the after-scenario hook; failures keep the step's own message
pub fn scenario_outcome(scenario: &gherkin::Scenario, finished: &ScenarioFinished) -> ScenarioOutcome {
    match finished {
        ScenarioFinished::StepFailed(_, _, err) => ScenarioOutcome::Failed(err.to_string()),
        ScenarioFinished::BeforeHookFailed(..) => {
            ScenarioOutcome::Failed(format!("Scenario '{}' could not start", scenario.name))
        }
        ScenarioFinished::StepSkipped => ScenarioOutcome::Skipped,
        ScenarioFinished::StepPassed => ScenarioOutcome::Passed,
    }
}
