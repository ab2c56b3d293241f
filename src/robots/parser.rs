//! Robots.txt parser implementation
//!
//! Only the parts needed for crawl-delay lookup are parsed: user-agent groups
//! and their `Crawl-delay` directive.

/// One `User-agent` group
#[derive(Debug, Clone, PartialEq)]
struct AgentGroup {
    /// Lowercased agent tokens
    agents: Vec<String>,
    crawl_delay: Option<f64>,
}

impl AgentGroup {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    /// Agent tokens match when they appear anywhere in the crawler's name
    fn applies_to(&self, normalized_agent: &str) -> bool {
        self.agents
            .iter()
            .any(|a| a != "*" && normalized_agent.contains(a.as_str()))
    }
}

/// Parsed robots.txt data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRobots {
    groups: Vec<AgentGroup>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A ParsedRobots instance; unparsable lines are ignored
    pub fn from_content(content: &str) -> Self {
        let mut groups: Vec<AgentGroup> = Vec::new();
        // A User-agent line after any rule starts a new group
        let mut in_rules = true;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if in_rules || groups.is_empty() {
                        groups.push(AgentGroup {
                            agents: Vec::new(),
                            crawl_delay: None,
                        });
                        in_rules = false;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "crawl-delay" => {
                    if let Some(group) = groups.last_mut() {
                        if let Ok(delay) = value.parse::<f64>() {
                            if delay.is_finite() && delay >= 0.0 {
                                group.crawl_delay = Some(delay);
                            }
                        }
                    }
                    in_rules = true;
                }
                _ => {
                    // Allow, Disallow, Sitemap, ... close the agent list
                    in_rules = true;
                }
            }
        }

        Self { groups }
    }

    /// Creates an empty ParsedRobots with no groups
    ///
    /// This is used when robots.txt is missing or could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// The first group naming the agent wins; if it has no delay, the `*`
    /// group's delay is used.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The user agent string; anything after `/` is ignored
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let normalized_agent = user_agent
            .split('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let specific = self
            .groups
            .iter()
            .find(|g| g.applies_to(&normalized_agent))
            .and_then(|g| g.crawl_delay);

        specific.or_else(|| {
            self.groups
                .iter()
                .find(|g| g.is_wildcard())
                .and_then(|g| g.crawl_delay)
        })
    }
}
