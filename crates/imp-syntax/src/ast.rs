use crate::error::Span;
use smallvec::SmallVec;
use std::fmt;

/// Flags attached to one command. Stored inline; pipelines rarely put more
/// than a handful of flags on a stage.
pub type FlagList = SmallVec<[Flag; 4]>;

/// Root of a parsed program: the start keyword, the mandatory source
/// declaration, and the head of the stage chain.
#[derive(Debug, Clone)]
pub struct StartCommand {
    pub name: String,
    pub target: TargetFlag,
    pub pipeline_head: Command,
    pub span: Span,
}

/// The declared source the pipeline operates on (image or folder path).
#[derive(Debug, Clone)]
pub struct TargetFlag {
    pub name: String,
    pub value: String,
    pub span: Span,
}

/// One pipeline stage. `next` links stages in left-to-right textual order;
/// construction only ever appends, so the chain is acyclic.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub flags: FlagList,
    pub next: Option<Box<Command>>,
    pub span: Span,
}

/// One `--name=value` modifier on a command.
#[derive(Debug, Clone)]
pub struct Flag {
    pub name: String,
    pub value: FlagValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Number(u64),
    Format(String),
    Path(String),
}

// Structural equality ignores spans; two programs are the same program no
// matter where in a source buffer they were written.

impl PartialEq for StartCommand {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.target == other.target
            && self.pipeline_head == other.pipeline_head
    }
}

impl PartialEq for TargetFlag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.flags == other.flags && self.next == other.next
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl StartCommand {
    /// Iterates the stage chain head-first, in declaration order.
    pub fn stages(&self) -> Stages<'_> {
        Stages {
            next: Some(&self.pipeline_head),
        }
    }
}

impl Command {
    /// Iterates this stage and everything chained after it.
    pub fn chain(&self) -> Stages<'_> {
        Stages { next: Some(self) }
    }
}

pub struct Stages<'a> {
    next: Option<&'a Command>,
}

impl<'a> Iterator for Stages<'a> {
    type Item = &'a Command;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next.as_deref();
        Some(current)
    }
}

/// Borrowed, read-only view over any node, for consumers that walk the tree
/// without caring which concrete type they hold (the diagram renderer).
/// Adding a node type means adding a variant here; every consumer match is
/// exhaustive.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Start(&'a StartCommand),
    Target(&'a TargetFlag),
    Command(&'a Command),
    Flag(&'a Flag),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRef::Start(_) => "StartCommand",
            NodeRef::Target(_) => "TargetFlag",
            NodeRef::Command(_) => "Command",
            NodeRef::Flag(_) => "Flag",
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            NodeRef::Start(n) => &n.name,
            NodeRef::Target(n) => &n.name,
            NodeRef::Command(n) => &n.name,
            NodeRef::Flag(n) => &n.name,
        }
    }

    /// Scalar payload, for the node kinds that carry one.
    pub fn value(&self) -> Option<String> {
        match self {
            NodeRef::Start(_) | NodeRef::Command(_) => None,
            NodeRef::Target(n) => Some(n.value.clone()),
            NodeRef::Flag(n) => Some(n.value.to_string()),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::Start(n) => n.span,
            NodeRef::Target(n) => n.span,
            NodeRef::Command(n) => n.span,
            NodeRef::Flag(n) => n.span,
        }
    }

    /// Child nodes in source order: target then chain head for the root,
    /// flags then the following stage for a command.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Start(n) => {
                vec![NodeRef::Target(&n.target), NodeRef::Command(&n.pipeline_head)]
            }
            NodeRef::Target(_) | NodeRef::Flag(_) => Vec::new(),
            NodeRef::Command(n) => {
                let mut children: Vec<NodeRef<'a>> =
                    n.flags.iter().map(NodeRef::Flag).collect();
                if let Some(next) = n.next.as_deref() {
                    children.push(NodeRef::Command(next));
                }
                children
            }
        }
    }
}

// Canonical re-serialization. Parsing the rendered text yields a
// structurally identical tree.

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Number(n) => write!(f, "{}", n),
            FlagValue::Format(s) | FlagValue::Path(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}={}", self.name, self.value)
    }
}

impl fmt::Display for TargetFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}=\"{}\"", self.name, self.value)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        if let Some(next) = self.next.as_deref() {
            write!(f, " -> {}", next)?;
        }
        Ok(())
    }
}

impl fmt::Display for StartCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.target, self.pipeline_head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 1, 0, 1)
    }

    fn stage(name: &str, next: Option<Command>) -> Command {
        Command {
            name: name.to_string(),
            flags: FlagList::new(),
            next: next.map(Box::new),
            span: span(),
        }
    }

    #[test]
    fn test_stage_iteration_order() {
        let chain = stage("crop", Some(stage("bw", Some(stage("compress", None)))));
        let names: Vec<&str> = chain.chain().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["crop", "bw", "compress"]);
    }

    #[test]
    fn test_equality_ignores_spans() {
        let a = Command {
            name: "crop".to_string(),
            flags: FlagList::new(),
            next: None,
            span: Span::new(1, 1, 0, 4),
        };
        let b = Command {
            name: "crop".to_string(),
            flags: FlagList::new(),
            next: None,
            span: Span::new(7, 3, 99, 103),
        };

        assert_eq!(a, b);
    }

    #[test]
    fn test_node_ref_children_order() {
        let mut flags = FlagList::new();
        flags.push(Flag {
            name: "x".to_string(),
            value: FlagValue::Number(10),
            span: span(),
        });
        let head = Command {
            name: "crop".to_string(),
            flags,
            next: Some(Box::new(stage("bw", None))),
            span: span(),
        };
        let children = NodeRef::Command(&head).children();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind(), "Flag");
        assert_eq!(children[0].value().as_deref(), Some("10"));
        assert_eq!(children[1].kind(), "Command");
        assert_eq!(children[1].name(), "bw");
    }

    #[test]
    fn test_display_canonical_form() {
        let mut flags = FlagList::new();
        flags.push(Flag {
            name: "lvl".to_string(),
            value: FlagValue::Number(5),
            span: span(),
        });
        let program = StartCommand {
            name: "imp".to_string(),
            target: TargetFlag {
                name: "target".to_string(),
                value: "in.png".to_string(),
                span: span(),
            },
            pipeline_head: Command {
                name: "compress".to_string(),
                flags,
                next: None,
                span: span(),
            },
            span: span(),
        };

        assert_eq!(program.to_string(), r#"imp --target="in.png" compress --lvl=5"#);
    }
}
