//! Built-in challenges that keep the app useful without an external bank.

use crate::domain::{ChallengeDefinition, Difficulty, StepDefinition, VisualizationKind};

fn step(id: u32, instruction: &str, hint: &str, patterns: &[&str], kind: VisualizationKind) -> StepDefinition {
  StepDefinition {
    id,
    instruction: instruction.into(),
    hint: hint.into(),
    acceptance_patterns: patterns.iter().map(|p| p.to_string()).collect(),
    visualization_kind: kind,
  }
}

const PYTHON_NODE_TEMPLATE: &str = "# Python - Linked List Node
class Node:
    def __init__(self, data):
        self.data = data
        self.next = None

# Create your first node here
";

const LINKED_LIST_STARTER: &str = "# Python - Linked List
# Define your node type below, then build the list step by step
";

const JS_NODE_TEMPLATE: &str = "// JavaScript - Linked List Node
class Node {
    constructor(data) {
        this.data = data;
        this.next = null;
    }
}

// Create your first node here
";

pub fn linked_list_intro() -> ChallengeDefinition {
  use VisualizationKind::*;
  ChallengeDefinition {
    id: "linked-list-intro".into(),
    title: "Introduction to Linked Lists".into(),
    description: "Learn how to create and connect nodes in a singly linked list".into(),
    difficulty: Difficulty::Beginner,
    xp_reward: 150,
    category: "Data Structures".into(),
    template: LINKED_LIST_STARTER.into(),
    initial_nodes: 1,
    steps: vec![
      step(1, "Create a new node structure with data and next pointer",
        "A node stores its value and a reference to the next node. In Python, use `__init__` to set `self.data` and `self.next`.",
        &["struct Node", "class Node", "self.next", "this.next"], NodeCreate),
      step(2, "Assign a value to your node's data field",
        "Set the data property to store a value like 42. `node = Node(42)`",
        &["data =", "data:", "value"], NodeCreate),
      step(3, "Create a second node and link it to the first",
        "Create a new node and set `first_node.next = second_node`. This creates the chain.",
        &["next =", "next:", "->next", ".next"], NodeLink),
      step(4, "Traverse the linked list to print all values",
        "Start with `current = head`. While `current` is not None, print `current.data` and move to `current.next`.",
        &["while", "current", "null", "None", "nullptr"], NodeTraverse),
      step(5, "Insert a node at the beginning (Head)",
        "Create a new node, point its next at the current head, then make it the head.",
        &["head", "next"], NodeLink),
      step(6, "Delete the last node",
        "Walk to the second-to-last node (where `current.next.next` is None) and set `current.next` to None.",
        &["next", "None", "null"], NodeTraverse),
    ],
  }
}

pub fn python_basics() -> ChallengeDefinition {
  ChallengeDefinition {
    id: "python-basics-1".into(),
    title: "Python: Variables & Printing".into(),
    description: "Learn the basics of Python: defining variables and printing to the console.".into(),
    difficulty: Difficulty::Beginner,
    xp_reward: 100,
    category: "Python".into(),
    template: PYTHON_NODE_TEMPLATE.into(),
    initial_nodes: 0,
    steps: vec![
      step(1, "Create a variable named `greeting` and assign it the string \"Hello CodeQuest\"",
        "In Python, you define a variable just by naming it: `variable_name = \"value\"`",
        &["greeting =", "\"Hello CodeQuest\"", "'Hello CodeQuest'"], VisualizationKind::Console),
      step(2, "Print the value of `greeting` to the console",
        "Use the `print()` function.",
        &["print(greeting)"], VisualizationKind::Console),
      step(3, "Create a variable `age` with value 25 and print it",
        "`age = 25` then `print(age)`",
        &["age = 25", "print(age)"], VisualizationKind::Console),
    ],
  }
}

pub fn js_functions() -> ChallengeDefinition {
  ChallengeDefinition {
    id: "js-functions-1".into(),
    title: "JavaScript: Functions".into(),
    description: "Master the power of reusable code with functions in JavaScript.".into(),
    difficulty: Difficulty::Beginner,
    xp_reward: 125,
    category: "JavaScript".into(),
    template: JS_NODE_TEMPLATE.into(),
    initial_nodes: 0,
    steps: vec![
      step(1, "Define a function named `sayHello` that prints \"Hello!\"",
        "Use `function sayHello() { ... }` or `const sayHello = () => { ... }`",
        &["function sayHello", "console.log(\"Hello!\")", "console.log('Hello!')"], VisualizationKind::Console),
      step(2, "Call the `sayHello` function",
        "Just write the function name followed by parentheses: `sayHello()`",
        &["sayHello()"], VisualizationKind::Console),
    ],
  }
}

/// Minimal set of built-in challenges.
pub fn seed_challenges() -> Vec<ChallengeDefinition> {
  vec![linked_list_intro(), python_basics(), js_functions()]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::checker::check;

  #[test]
  fn seeds_are_valid() {
    for c in seed_challenges() {
      c.validate().unwrap_or_else(|e| panic!("{}: {e}", c.id));
    }
  }

  #[test]
  fn untouched_template_does_not_pass_first_step() {
    for c in seed_challenges() {
      assert!(!check(&c.template, &c.steps[0]), "{} starter passes step 1", c.id);
    }
  }
}
