use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{get_folder_name, is_under_folder, lexical_clean};
use crate::error::{Result, SgsstError};

/// Maximum number of back steps remembered per view
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Folder browsing state of one document view
///
/// Starts at the submodule folder; entering a subfolder remembers where we
/// were so `back` can return there. Browsing never leaves the root.
#[derive(Debug, Clone)]
pub struct Navigator {
    root: PathBuf,
    current: PathBuf,
    history: VecDeque<PathBuf>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// What the frontend needs to draw the header of a view
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub root: String,
    pub current: String,
    pub can_go_back: bool,
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl Navigator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = lexical_clean(&root.into());
        Self {
            current: root.clone(),
            root,
            history: VecDeque::with_capacity(MAX_HISTORY_ENTRIES),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Open a folder below the root
    pub fn enter(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = lexical_clean(&dir.into());
        if !is_under_folder(&dir.to_string_lossy(), &self.root.to_string_lossy()) {
            return Err(SgsstError::State(format!(
                "{} is outside {}",
                dir.display(),
                self.root.display()
            )));
        }
        if dir == self.current {
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.current, dir);
        self.history.push_back(previous);
        while self.history.len() > MAX_HISTORY_ENTRIES {
            self.history.pop_front();
        }
        Ok(())
    }

    /// Return to the previous folder; stays put when there is none
    pub fn back(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Start over at a new root (e.g. a different submodule)
    pub fn reset(&mut self, root: impl Into<PathBuf>) {
        *self = Self::new(root);
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Root folder followed by every folder down to the current one
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            name: get_folder_name(&self.root.to_string_lossy()),
            path: self.root.to_string_lossy().to_string(),
        }];

        if let Ok(relative) = self.current.strip_prefix(&self.root) {
            let mut path = self.root.clone();
            for component in relative.components() {
                path.push(component);
                crumbs.push(Breadcrumb {
                    name: component.as_os_str().to_string_lossy().to_string(),
                    path: path.to_string_lossy().to_string(),
                });
            }
        }

        crumbs
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            root: self.root.to_string_lossy().to_string(),
            current: self.current.to_string_lossy().to_string(),
            can_go_back: self.can_go_back(),
            breadcrumbs: self.breadcrumbs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_back() {
        let mut nav = Navigator::new("/t/1.1.6 Copasst");
        assert!(!nav.can_go_back());

        nav.enter("/t/1.1.6 Copasst/2024").unwrap();
        nav.enter("/t/1.1.6 Copasst/2024/Enero").unwrap();
        assert_eq!(nav.current(), Path::new("/t/1.1.6 Copasst/2024/Enero"));

        assert!(nav.back());
        assert_eq!(nav.current(), Path::new("/t/1.1.6 Copasst/2024"));
        assert!(nav.back());
        assert_eq!(nav.current(), nav.root());
        assert!(!nav.back());
        assert_eq!(nav.current(), nav.root());
    }

    #[test]
    fn test_cannot_leave_root() {
        let mut nav = Navigator::new("/t/1.1.6 Copasst");
        assert!(nav.enter("/t/1.1.8 Convivencia").is_err());
        assert!(nav.enter("/t/1.1.6 Copasst2").is_err());
        assert_eq!(nav.current(), nav.root());
    }

    #[test]
    fn test_parent_segments_cannot_escape_root() {
        let mut nav = Navigator::new("/t/Copasst");
        assert!(nav.enter("/t/Copasst/../Convivencia").is_err());
        assert!(nav.enter("/t/Copasst/2024/../../Convivencia").is_err());
        assert_eq!(nav.current(), nav.root());

        nav.enter("/t/Copasst/2024/../2025").unwrap();
        assert_eq!(nav.current(), Path::new("/t/Copasst/2025"));
    }

    #[test]
    fn test_entering_current_folder_is_noop() {
        let mut nav = Navigator::new("/t/a");
        nav.enter("/t/a").unwrap();
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut nav = Navigator::new("/r");
        for i in 0..(MAX_HISTORY_ENTRIES + 10) {
            nav.enter(format!("/r/{}", i)).unwrap();
        }
        let mut steps = 0;
        while nav.back() {
            steps += 1;
        }
        assert_eq!(steps, MAX_HISTORY_ENTRIES);
    }

    #[test]
    fn test_breadcrumbs_and_reset() {
        let mut nav = Navigator::new("/t/Copasst");
        nav.enter("/t/Copasst/2024/Enero").unwrap();

        let snapshot = nav.snapshot();
        let names: Vec<_> = snapshot.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Copasst", "2024", "Enero"]);
        assert_eq!(snapshot.breadcrumbs[1].path, "/t/Copasst/2024");
        assert!(snapshot.can_go_back);

        nav.reset("/t/Convivencia");
        assert_eq!(nav.current(), Path::new("/t/Convivencia"));
        assert!(!nav.can_go_back());
    }
}
