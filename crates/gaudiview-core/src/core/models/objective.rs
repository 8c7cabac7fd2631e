/// Name of the pseudo-objective that stores cluster assignments.
pub const CLUSTER_COLUMN: &str = "Cluster";

/// One named, ordered scoring dimension of a solution.
///
/// GAUDI writes objectives as descriptors of the form `"<name> (<unit>)"`. The canonical
/// name is the text up to the first whitespace; the unit is whatever sits inside the first
/// pair of parentheses after it. The raw descriptor is kept so that a serialized file
/// reproduces it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub name: String,
    pub unit: Option<String>,
    descriptor: String,
}

impl Objective {
    /// Builds an objective from a name and an optional unit.
    pub fn new(name: &str, unit: Option<&str>) -> Self {
        let descriptor = match unit {
            Some(unit) => format!("{} ({})", name, unit),
            None => name.to_string(),
        };
        Self {
            name: name.to_string(),
            unit: unit.map(str::to_string),
            descriptor,
        }
    }

    /// Parses a GAUDI objective descriptor.
    ///
    /// Returns `None` when the descriptor contains no name at all.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let trimmed = descriptor.trim();
        let name = trimmed.split_whitespace().next()?;
        let rest = &trimmed[name.len()..];

        let unit = rest.find('(').and_then(|open| {
            let inner = &rest[open + 1..];
            inner
                .find(')')
                .map(|close| inner[..close].trim().to_string())
                .filter(|u| !u.is_empty())
        });

        Some(Self {
            name: name.to_string(),
            unit,
            descriptor: descriptor.to_string(),
        })
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn is_cluster(&self) -> bool {
        self.name == CLUSTER_COLUMN
    }
}

/// Two schemas are the same when their objective names match in count and order.
///
/// Units are ignored: "Score (kcal/mol)" and "Score (kJ)" name the same column.
pub fn same_schema(left: &[Objective], right: &[Objective]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| a.name == b.name)
}

pub fn objective_names(objectives: &[Objective]) -> Vec<String> {
    objectives.iter().map(|o| o.name.clone()).collect()
}
