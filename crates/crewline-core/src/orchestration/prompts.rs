//! Prompt text for the four orchestration calls, phrased per roster

use crate::agents::{RosterKind, SpecialistProfile, SubTask};

const JSON_ONLY: &str = "Return ONLY valid JSON, no other text.";

/// Roster-specific wording
struct Phrasing {
    analyst: &'static str,
    example_type: &'static str,
    example_tool: &'static str,
    example_capabilities: &'static str,
    guidance: &'static str,
    query_label: &'static str,
    history_label: &'static str,
    router_system: &'static str,
    task_label: &'static str,
    candidates_label: &'static str,
    delegation_system: &'static str,
    current_label: &'static str,
    capabilities_label: &'static str,
    synthesis_system: &'static str,
    synthesis_intro: &'static str,
    synthesis_query_label: &'static str,
    synthesis_results_label: &'static str,
    synthesis_closing: &'static str,
}

const GENERAL: Phrasing = Phrasing {
    analyst: "You are an expert task analyst. Decompose the user query into subtasks.",
    example_type: "research",
    example_tool: "search_web",
    example_capabilities: "\"web_research\", \"fact_checking\"",
    guidance: "",
    query_label: "Query",
    history_label: "Conversation context",
    router_system: "You are an expert at matching tasks with agents.",
    task_label: "Task",
    candidates_label: "Available agents",
    delegation_system: "Determine if this task should be delegated.",
    current_label: "Current agent",
    capabilities_label: "Agent capabilities",
    synthesis_system: "You are a master synthesizer. Combine the task results into a clear, comprehensive response.",
    synthesis_intro: "Synthesize these task results into a cohesive response:",
    synthesis_query_label: "Original query",
    synthesis_results_label: "Task results",
    synthesis_closing: "",
};

const WEALTH: Phrasing = Phrasing {
    analyst: "You are an expert wealth advisory task analyst at a Universal Bank.\n\
Analyze client inquiries and decompose them into actionable subtasks for our specialist team.",
    example_type: "portfolio_analysis",
    example_tool: "client_portfolio_query",
    example_capabilities: "\"portfolio_optimization\", \"risk_modeling\"",
    guidance: "\n\nConsider wealth management context:\n\
- Portfolio reviews need quantitative analysis before strategic recommendations\n\
- Investment recommendations require compliance checks\n\
- Client communications should synthesize findings from other specialists",
    query_label: "Client inquiry",
    history_label: "Client conversation history",
    router_system: "You are a wealth advisory team coordinator. Match client tasks with the most suitable specialist.",
    task_label: "Client Task",
    candidates_label: "Available specialists",
    delegation_system: "Determine if this wealth advisory task should be delegated to another specialist.",
    current_label: "Current specialist",
    capabilities_label: "Specialist capabilities",
    synthesis_system: "You are a senior wealth advisor at a Universal Bank. Synthesize specialist findings into clear, professional client advisory communications.",
    synthesis_intro: "As a senior wealth advisor, synthesize these specialist findings into a clear, actionable client advisory response.",
    synthesis_query_label: "Original Client Inquiry",
    synthesis_results_label: "Specialist Findings",
    synthesis_closing: "\n\nPlease provide a comprehensive advisory response that:\n\
1. Addresses the client's original inquiry directly\n\
2. Integrates insights from all specialist analyses\n\
3. Provides clear, actionable recommendations\n\
4. Highlights any risks or considerations\n\
5. Uses professional wealth advisory language appropriate for client communication\n",
};

fn phrasing(roster: RosterKind) -> &'static Phrasing {
    match roster {
        RosterKind::General => &GENERAL,
        RosterKind::WealthAdvisory => &WEALTH,
    }
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn analyzer_system(roster: RosterKind) -> String {
    let p = phrasing(roster);
    let types: Vec<&str> = roster.task_types().iter().map(|t| t.as_str()).collect();

    format!(
        r#"{analyst}

For each subtask identify:
1. Task type ({types})
2. Complexity (1-5)
3. Dependencies on other tasks
4. Required tools ({tools})
5. Required capabilities

Return a JSON with this structure:
{{
    "subtasks": [
        {{
            "id": "task_1",
            "description": "...",
            "type": "{example_type}",
            "complexity": 3,
            "dependencies": [],
            "required_tools": ["{example_tool}"],
            "required_capabilities": [{example_capabilities}]
        }}
    ],
    "execution_order": ["task_1", "task_2"],
    "parallel_groups": [["task_1", "task_3"], ["task_2"]]
}}{guidance}

IMPORTANT: {json_only}"#,
        analyst = p.analyst,
        types = types.join(", "),
        tools = roster.tool_names().join(", "),
        example_type = p.example_type,
        example_tool = p.example_tool,
        example_capabilities = p.example_capabilities,
        guidance = p.guidance,
        json_only = JSON_ONLY,
    )
}

/// `history` is the JSON of the most recent turns, if any
pub fn analyzer_user(roster: RosterKind, query: &str, history: Option<&str>) -> String {
    let p = phrasing(roster);
    match history {
        Some(history) => format!(
            "{}: {}\n\n{}:\n{}",
            p.query_label, query, p.history_label, history
        ),
        None => format!("{}: {}", p.query_label, query),
    }
}

pub fn router_system(roster: RosterKind) -> String {
    format!(
        "{} Return JSON with 'agent' and 'confidence' (0-1). {}",
        phrasing(roster).router_system,
        JSON_ONLY
    )
}

/// One line per candidate: `- name: role (capability score: x.xx)`
pub fn candidate_line(name: &str, role: &str, score: f64) -> String {
    format!("- {}: {} (capability score: {:.2})", name, role, score)
}

pub fn router_user(roster: RosterKind, task: &SubTask, candidate_lines: &[String]) -> String {
    let p = phrasing(roster);
    format!(
        "{}: {}\nType: {}\nComplexity: {}\nRequired capabilities: {}\n\n{}:\n{}",
        p.task_label,
        task.description,
        task.task_type,
        task.complexity,
        quoted_list(&task.required_capabilities),
        p.candidates_label,
        candidate_lines.join("\n")
    )
}

pub fn delegation_system(roster: RosterKind) -> String {
    format!(
        "{} Return JSON with 'should_delegate' (bool), 'to_agent' (str or null), 'reason' (str), 'confidence' (0-1). {}",
        phrasing(roster).delegation_system,
        JSON_ONLY
    )
}

pub fn delegation_user(roster: RosterKind, current: &SpecialistProfile, task: &SubTask) -> String {
    let p = phrasing(roster);
    let capabilities: Vec<String> = current
        .capability_names()
        .into_iter()
        .map(String::from)
        .collect();

    format!(
        "{}: {} ({})\nTask: {}\nTask complexity: {}\n{}: {}\nRequired capabilities: {}",
        p.current_label,
        current.name,
        current.role,
        task.description,
        task.complexity,
        p.capabilities_label,
        quoted_list(&capabilities),
        quoted_list(&task.required_capabilities)
    )
}

pub fn synthesis_system(roster: RosterKind) -> &'static str {
    phrasing(roster).synthesis_system
}

/// One block per result.
///
/// General: `task_id (description) - Agent: name:` then the text.
/// Wealth advisory: `task_id (description)`, a `Specialist:` line, then
/// the text under `Findings:`.
pub fn synthesis_entry(
    roster: RosterKind,
    task_id: &str,
    description: &str,
    agent: &str,
    result: &str,
) -> String {
    match roster {
        RosterKind::General => {
            format!("\n{} ({}) - Agent: {}:\n{}\n", task_id, description, agent, result)
        }
        RosterKind::WealthAdvisory => format!(
            "\n{} ({})\nSpecialist: {}\nFindings:\n{}\n",
            task_id, description, agent, result
        ),
    }
}

pub fn synthesis_user(roster: RosterKind, query: &str, entries: &[String]) -> String {
    let p = phrasing(roster);
    format!(
        "{}\n\n{}: {}\n\n{}:\n{}{}",
        p.synthesis_intro,
        p.synthesis_query_label,
        query,
        p.synthesis_results_label,
        entries.concat(),
        p.synthesis_closing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::TaskType;

    #[test]
    fn test_analyzer_system_lists_roster_vocabulary() {
        let general = analyzer_system(RosterKind::General);
        assert!(general.contains("research, analysis, creative, technical, financial, legal, general"));
        assert!(general.contains("search_web, database_query"));
        assert!(general.ends_with(JSON_ONLY));

        let wealth = analyzer_system(RosterKind::WealthAdvisory);
        assert!(wealth.contains("portfolio_analysis, market_research"));
        assert!(wealth.contains("Investment recommendations require compliance checks"));
        assert!(wealth.contains("\"type\": \"portfolio_analysis\""));
    }

    #[test]
    fn test_analyzer_user_with_history() {
        assert_eq!(analyzer_user(RosterKind::General, "hi", None), "Query: hi");
        let text = analyzer_user(RosterKind::WealthAdvisory, "hi", Some("[]"));
        assert_eq!(text, "Client inquiry: hi\n\nClient conversation history:\n[]");
    }

    #[test]
    fn test_candidate_line_format() {
        assert_eq!(
            candidate_line("billing", "Billing Specialist", 0.9),
            "- billing: Billing Specialist (capability score: 0.90)"
        );
    }

    #[test]
    fn test_router_user_lists_candidates() {
        let task = SubTask::new("task_1", "Check balance", TaskType::Financial)
            .with_capabilities(["account_lookup"]);
        let text = router_user(
            RosterKind::General,
            &task,
            &[candidate_line("billing", "Billing", 1.0)],
        );
        assert!(text.starts_with("Task: Check balance\nType: financial\nComplexity: 3"));
        assert!(text.contains("Required capabilities: ['account_lookup']"));
        assert!(text.ends_with("Available agents:\n- billing: Billing (capability score: 1.00)"));
    }

    #[test]
    fn test_synthesis_entry_format() {
        assert_eq!(
            synthesis_entry(RosterKind::General, "task_1", "Find news", "research_specialist", "News."),
            "\ntask_1 (Find news) - Agent: research_specialist:\nNews.\n"
        );
        let text = synthesis_user(RosterKind::General, "q", &["\nA\n".to_string()]);
        assert!(text.contains("Original query: q"));
        assert!(text.ends_with("Task results:\n\nA\n"));
    }

    #[test]
    fn test_wealth_synthesis_uses_findings_layout() {
        assert_eq!(
            synthesis_entry(
                RosterKind::WealthAdvisory,
                "task_1",
                "Review allocation",
                "portfolio_manager",
                "Overweight equities."
            ),
            "\ntask_1 (Review allocation)\nSpecialist: portfolio_manager\nFindings:\nOverweight equities.\n"
        );

        let text = synthesis_user(RosterKind::WealthAdvisory, "Am I diversified?", &["\nA\n".to_string()]);
        assert!(text.contains("Original Client Inquiry: Am I diversified?\n\nSpecialist Findings:\n\nA\n"));
        assert!(text.contains("1. Addresses the client's original inquiry directly"));
        assert!(!text.contains("Task results"));
    }
}
