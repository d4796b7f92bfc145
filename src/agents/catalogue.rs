// ABOUTME: Worker capability catalogue rendered into planner prompts
// ABOUTME: Ships the default worker fleet with endpoints, descriptions, and action signatures

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub endpoint: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl AgentSpec {
    pub fn new(endpoint: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogueEntry {
    pub agent: String,
    pub description: String,
    pub actions: Vec<String>,
}

/// What each worker can do, as presented to the planner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

impl Catalogue {
    pub fn from_specs(specs: &IndexMap<String, AgentSpec>) -> Self {
        let entries = specs
            .iter()
            .map(|(name, spec)| CatalogueEntry {
                agent: name.clone(),
                description: spec.description.clone(),
                actions: spec.actions.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn get(&self, agent: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|e| e.agent == agent)
    }

    /// Plain-text listing, one agent per line followed by its actions
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if entry.description.is_empty() {
                out.push_str(&format!("- {}\n", entry.agent));
            } else {
                out.push_str(&format!("- {}: {}\n", entry.agent, entry.description));
            }
            for action in &entry.actions {
                out.push_str(&format!("    - {}\n", action));
            }
        }
        out
    }
}

const DEFAULT_FLEET: &[(&str, u16, &str, &[&str])] = &[
    (
        "calendar",
        50051,
        "Can create, list, and manage calendar events.",
        &[],
    ),
    (
        "gmail",
        50052,
        "Can draft and send emails.",
        &["gmail.send_email(to: string, subject: string, body: string, ical?: { start: string, end: string, summary: string, location?: string })"],
    ),
    (
        "browser",
        50053,
        "Can search the web and scrape pages.",
        &["browser.search(query: string)", "browser.scrape(url: string)"],
    ),
    (
        "os",
        50054,
        "Can perform file operations and launch applications.",
        &[
            "os.create_file(path: string, content: string)",
            "os.delete_file(path: string)",
            "os.update_file(path: string, content: string)",
            "os.move_file(source: string, destination: string)",
            "os.read_file(path: string)",
            "os.list_directory(path: string)",
            "os.open_app(app_name: string, url?: string)",
            "os.open_folder(path: string)",
            "os.run_command(command: string)",
        ],
    ),
    (
        "humanizer",
        50055,
        "Can rewrite text to sound more human and natural.",
        &["humanizer.humanize_content(content: string)"],
    ),
    (
        "interpreter",
        50056,
        "Converts user instructions into clear technical requirements.",
        &["interpreter.interpret(input: string)"],
    ),
    (
        "planner",
        50057,
        "Designs architecture, workflow, and file structure.",
        &["planner.plan_system(requirements: string)"],
    ),
    (
        "codegen",
        50058,
        "Writes code for each required module.",
        &["codegen.generate(spec: string)"],
    ),
    (
        "execution",
        50059,
        "Runs the generated code and captures outputs or errors.",
        &["execution.run(command: string, cwd?: string)"],
    ),
    (
        "debugger",
        50060,
        "Analyzes failures and fixes code issues.",
        &["debugger.debug(code: string, error: string)"],
    ),
    (
        "qa",
        50061,
        "Validates correctness using tests, edge cases, and scenarios.",
        &["qa.generate_tests(code: string)"],
    ),
    (
        "reviewer",
        50062,
        "Improves code quality, structure, and performance.",
        &["reviewer.review(code: string)"],
    ),
    (
        "dependency",
        50063,
        "Installs, updates, and manages project libraries.",
        &["dependency.manage(command: string, package: string, cwd?: string, manager?: string)"],
    ),
    (
        "docs",
        50064,
        "Produces README, API docs, and usage guides.",
        &["docs.generate(code: string, type?: string)"],
    ),
    (
        "research",
        50065,
        "Looks up examples, patterns, and best practices.",
        &["research.research(topic: string)"],
    ),
    (
        "memory",
        50066,
        "Stores and retrieves information for later use.",
        &[
            "memory.store(key?: string, value: any, context: string)",
            "memory.retrieve(key: string)",
            "memory.search(query: string, semantic?: boolean)",
            "memory.list()",
            "memory.forget(key: string)",
        ],
    ),
    (
        "excel",
        50067,
        "Spreadsheet automation and manipulation.",
        &[
            "excel.create_workbook(name: string, path?: string, sheet_name?: string)",
            "excel.read_range(file_path: string, sheet: string, range: string)",
            "excel.write_range(file_path: string, sheet: string, range: string, values: array)",
            "excel.add_sheet(file_path: string, sheet_name: string)",
            "excel.create_table(file_path: string, sheet: string, range: string, table_name: string, columns?: array, rows?: array)",
            "excel.add_chart(file_path: string, sheet: string, chart_type: string, data_range: string, position?: string)",
            "excel.apply_formula(file_path: string, sheet: string, cell: string, formula: string)",
        ],
    ),
];

/// The default worker fleet, each listening on localhost
pub fn default_agents() -> IndexMap<String, AgentSpec> {
    DEFAULT_FLEET
        .iter()
        .map(|(name, port, description, actions)| {
            (
                name.to_string(),
                AgentSpec::new(format!("http://localhost:{}", port), *description)
                    .with_actions(actions.iter().copied()),
            )
        })
        .collect()
}
