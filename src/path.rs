use std::sync::Arc;

/// A hierarchical, dot-separated signal name, such as `top.timer`.
#[derive(Ord, PartialOrd, Eq, PartialEq, Clone, Hash)]
pub struct Path(Arc<String>);

impl Path {
    pub fn parent(&self) -> Path {
        let mut path_parts: Vec<&str> = self.split('.').collect();
        path_parts.pop();
        path_parts.join(".").into()
    }

    /// The last segment of the path.
    pub fn name(&self) -> &str {
        self.rsplit('.').next().unwrap_or_default()
    }

    pub fn segments(&self) -> Vec<&str> {
        self.split('.').filter(|segment| !segment.is_empty()).collect()
    }

    pub fn join(&self, path: Path) -> Path {
        if self.is_empty() {
            path
        } else {
            format!("{}.{}", self, path).into()
        }
    }
}

impl std::ops::Deref for Path {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", &self.0)
    }
}

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "Path(\"{}\")", &self.0)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Path {
        Path(Arc::new(path))
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Path {
        Path(Arc::new(path.to_string()))
    }
}

#[test]
fn path_parts() {
    let path: Path = "top.cpu.pc".into();
    assert_eq!(path.parent(), "top.cpu".into());
    assert_eq!(path.name(), "pc");
    assert_eq!(path.segments(), vec!["top", "cpu", "pc"]);

    let top: Path = "top".into();
    assert_eq!(top.parent(), "".into());
    assert_eq!(top.name(), "top");
    assert_eq!(Path::from("").join("clk".into()), "clk".into());
    assert_eq!(top.join("clk".into()), "top.clk".into());
}
