use std::collections::{BTreeMap, BTreeSet};

use crate::error::StartupError;

/// A registered component and the names of the components it needs first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDecl {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl SystemDecl {
    pub fn new(name: &str, dependencies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Order components so each comes after everything it depends on.
///
/// Among components that are ready at the same time, the earlier-registered one goes
/// first (then the lexically smaller name), so the order is stable across runs. Returns
/// indices into `decls`.
pub fn order_systems(decls: &[SystemDecl]) -> Result<Vec<usize>, StartupError> {
    let mut by_name: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, decl) in decls.iter().enumerate() {
        if by_name.insert(decl.name.as_str(), i).is_some() {
            return Err(StartupError::DuplicateSystem(decl.name.clone()));
        }
    }

    let mut remaining_deps = vec![0usize; decls.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); decls.len()];
    for (i, decl) in decls.iter().enumerate() {
        let unique: BTreeSet<&str> = decl.dependencies.iter().map(String::as_str).collect();
        for dep in unique {
            let Some(&d) = by_name.get(dep) else {
                return Err(StartupError::MissingDependency {
                    system: decl.name.clone(),
                    dependency: dep.to_string(),
                });
            };
            remaining_deps[i] += 1;
            dependents[d].push(i);
        }
    }

    let mut ready: BTreeSet<(usize, &str)> = decls
        .iter()
        .enumerate()
        .filter(|(i, _)| remaining_deps[*i] == 0)
        .map(|(i, d)| (i, d.name.as_str()))
        .collect();
    let mut order = Vec::with_capacity(decls.len());

    while let Some((i, _)) = ready.pop_first() {
        order.push(i);
        for &dependent in &dependents[i] {
            remaining_deps[dependent] -= 1;
            if remaining_deps[dependent] == 0 {
                ready.insert((dependent, decls[dependent].name.as_str()));
            }
        }
    }

    if order.len() != decls.len() {
        let systems = decls
            .iter()
            .enumerate()
            .filter(|(i, _)| remaining_deps[*i] > 0)
            .map(|(_, d)| d.name.clone())
            .collect();
        return Err(StartupError::DependencyCycle { systems });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(decls: &[SystemDecl], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| decls[i].name.clone()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let decls = vec![
            SystemDecl::new("elections", &["office_catalog"]),
            SystemDecl::new("mortality", &[]),
            SystemDecl::new("office_catalog", &[]),
        ];
        let order = order_systems(&decls).unwrap();
        assert_eq!(
            names(&decls, &order),
            vec!["mortality", "office_catalog", "elections"]
        );
    }

    #[test]
    fn independent_systems_keep_registration_order() {
        let decls = vec![
            SystemDecl::new("zeta", &[]),
            SystemDecl::new("alpha", &[]),
            SystemDecl::new("mid", &["zeta"]),
        ];
        let order = order_systems(&decls).unwrap();
        assert_eq!(names(&decls, &order), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_dependency_fails() {
        let decls = vec![SystemDecl::new("elections", &["office_catalog"])];
        assert_eq!(
            order_systems(&decls),
            Err(StartupError::MissingDependency {
                system: "elections".into(),
                dependency: "office_catalog".into(),
            })
        );
    }

    #[test]
    fn cycle_fails_and_names_members() {
        let decls = vec![
            SystemDecl::new("root", &[]),
            SystemDecl::new("a", &["b"]),
            SystemDecl::new("b", &["a"]),
        ];
        assert_eq!(
            order_systems(&decls),
            Err(StartupError::DependencyCycle {
                systems: vec!["a".into(), "b".into()],
            })
        );
    }

    #[test]
    fn duplicate_names_fail() {
        let decls = vec![SystemDecl::new("a", &[]), SystemDecl::new("a", &[])];
        assert_eq!(
            order_systems(&decls),
            Err(StartupError::DuplicateSystem("a".into()))
        );
    }
}
