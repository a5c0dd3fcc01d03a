//! This module contains a limited symbolic evaluator for TEAL.
//!
//! The evaluator walks the instructions along a [`Path`] with an abstract stack
//! of symbolic [`Value`]s, and records the [`Condition`]s that must hold for
//! execution to continue along that path. These come from `assert`, from the
//! direction taken at each conditional branch, and from the value with which
//! the program finally approves.
//!
//! # Precision
//!
//! Only the values that matter to the built-in detectors are tracked:
//! constants, transaction and global fields, application state reads, and the
//! comparisons and boolean connectives that combine them. Everything else is
//! [`Value::Unknown`]. Stack underflow also produces unknown values rather than
//! an error, as the stack at the start of a subroutine or block is not always
//! known.

use std::{
    collections::{BTreeMap, BTreeSet},
    iter,
};

use crate::{
    analysis::paths::Path,
    cfg::BlockId,
    contract::Contract,
    field::{GlobalField, TransactionField},
    instruction::{Immediate, Instruction},
    opcode::{Opcode, StackEffect},
};

/// The integer comparison operators.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparison {
    /// Gets the comparison performed by `opcode`, if it is one.
    #[must_use]
    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        Some(match opcode {
            Opcode::Eq => Self::Eq,
            Opcode::Ne => Self::Ne,
            Opcode::Lt => Self::Lt,
            Opcode::Gt => Self::Gt,
            Opcode::Le => Self::Le,
            Opcode::Ge => Self::Ge,
            _ => return None,
        })
    }

    /// Evaluates the comparison `left <op> right`.
    #[must_use]
    pub fn holds(self, left: u64, right: u64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
        }
    }

    /// Gets the comparison that holds for `right <op> left` exactly when this
    /// one holds for `left <op> right`.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
        }
    }
}

/// A symbolic value on the abstract stack.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Value {
    /// A known integer.
    Uint(u64),

    /// A known byte string.
    Bytes(crate::instruction::ByteLiteral),

    /// A known account address.
    Address(String),

    /// A field of the transaction being evaluated.
    Txn(TransactionField),

    /// A field of a transaction in the group, where `index` is [`None`] if it
    /// is not known.
    GroupTxn {
        index: Option<u64>,
        field: TransactionField,
    },

    /// A global field.
    Global(GlobalField),

    /// A value read from the application's global state under a key.
    GlobalState(Box<Value>),

    /// An integer comparison.
    Compare(Comparison, Box<Value>, Box<Value>),

    /// Logical negation.
    Not(Box<Value>),

    /// Logical conjunction.
    And(Box<Value>, Box<Value>),

    /// Logical disjunction.
    Or(Box<Value>, Box<Value>),

    /// A value that is not tracked.
    Unknown,
}

impl Value {
    /// Gets the known integer value of this value, if any.
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Builds the comparison of `left` and `right`, folding it if both are
    /// known.
    #[must_use]
    pub fn compare(op: Comparison, left: Self, right: Self) -> Self {
        match (left.as_uint(), right.as_uint()) {
            (Some(l), Some(r)) => Self::Uint(u64::from(op.holds(l, r))),
            _ => Self::Compare(op, Box::new(left), Box::new(right)),
        }
    }

    /// Builds the logical negation of `value`, folding it if it is known.
    #[must_use]
    pub fn not(value: Self) -> Self {
        match value {
            Self::Uint(v) => Self::Uint(u64::from(v == 0)),
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Builds the conjunction of `left` and `right`, folding known operands.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        match (left.as_uint(), right.as_uint()) {
            (Some(0), _) | (_, Some(0)) => Self::Uint(0),
            (Some(_), Some(_)) => Self::Uint(1),
            (Some(_), None) => right,
            (None, Some(_)) => left,
            (None, None) => Self::And(Box::new(left), Box::new(right)),
        }
    }

    /// Builds the disjunction of `left` and `right`, folding known operands.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        match (left.as_uint(), right.as_uint()) {
            (Some(l), _) if l != 0 => Self::Uint(1),
            (_, Some(r)) if r != 0 => Self::Uint(1),
            (Some(_), Some(_)) => Self::Uint(0),
            (Some(_), None) => right,
            (None, Some(_)) => left,
            (None, None) => Self::Or(Box::new(left), Box::new(right)),
        }
    }
}

/// A statement that a value is either true (non-zero) or false (zero).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Condition {
    pub value: Value,
    pub holds: bool,
}

impl Condition {
    #[must_use]
    pub fn new(value: Value, holds: bool) -> Self {
        Self { value, holds }
    }

    /// Splits the condition into the simplest conditions that it implies.
    ///
    /// Conjunctions that hold and disjunctions that do not are split into their
    /// operands, negations are pushed inwards, and `!=` is rewritten as `==`.
    #[must_use]
    pub fn atoms(&self) -> Vec<Condition> {
        let mut atoms = Vec::new();
        Self::collect_atoms(&self.value, self.holds, &mut atoms);
        atoms
    }

    fn collect_atoms(value: &Value, holds: bool, atoms: &mut Vec<Condition>) {
        match (value, holds) {
            (Value::Not(inner), _) => Self::collect_atoms(inner, !holds, atoms),
            (Value::And(l, r), true) | (Value::Or(l, r), false) => {
                Self::collect_atoms(l, holds, atoms);
                Self::collect_atoms(r, holds, atoms);
            }
            (Value::Compare(Comparison::Ne, l, r), _) => atoms.push(Condition::new(
                Value::Compare(Comparison::Eq, l.clone(), r.clone()),
                !holds,
            )),
            _ => atoms.push(Condition::new(value.clone(), holds)),
        }
    }

    /// Checks whether the condition implies that `left == right`, where the
    /// operands are recognised by the provided predicates in either order.
    pub fn implies_equality(
        &self,
        left: impl Fn(&Value) -> bool,
        right: impl Fn(&Value) -> bool,
    ) -> bool {
        self.atoms().iter().any(|atom| match (&atom.value, atom.holds) {
            (Value::Compare(Comparison::Eq, l, r), true) => {
                (left(l) && right(r)) || (left(r) && right(l))
            }
            _ => false,
        })
    }

    /// Checks whether the condition constrains `subject` in any way.
    #[must_use]
    pub fn mentions(&self, subject: &Value) -> bool {
        self.atoms().iter().any(|atom| match &atom.value {
            Value::Compare(_, l, r) => **l == *subject || **r == *subject,
            other => other == subject,
        })
    }

    /// Checks whether the condition rules out `subject` being equal to
    /// `constant`.
    #[must_use]
    pub fn rules_out(&self, subject: &Value, constant: u64) -> bool {
        Self::excludes(&self.value, self.holds, subject, constant)
    }

    fn excludes(value: &Value, holds: bool, subject: &Value, constant: u64) -> bool {
        match (value, holds) {
            (Value::Not(inner), _) => Self::excludes(inner, !holds, subject, constant),
            (Value::And(l, r), true) | (Value::Or(l, r), false) => {
                Self::excludes(l, holds, subject, constant)
                    || Self::excludes(r, holds, subject, constant)
            }
            (Value::And(l, r), false) | (Value::Or(l, r), true) => {
                Self::excludes(l, holds, subject, constant)
                    && Self::excludes(r, holds, subject, constant)
            }
            (Value::Compare(op, l, r), _) => {
                let (op, other) = if **l == *subject {
                    (*op, r)
                } else if **r == *subject {
                    (op.flipped(), l)
                } else {
                    return false;
                };
                match other.as_uint() {
                    Some(k) => op.holds(constant, k) != holds,
                    None => false,
                }
            }
            (v, _) if v == subject => (constant != 0) != holds,
            _ => false,
        }
    }
}

/// A condition along with the place where it was established.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fact {
    pub condition: Condition,
    pub block:     BlockId,
    pub line:      u32,
}

/// Whether execution along a path can approve the transaction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    /// The path approves, subject to its facts.
    Approve,

    /// The path can never approve.
    Reject,

    /// The path was cut short at a cycle or a recursive call before the
    /// program ended.
    Unfinished,
}

/// The result of evaluating a path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    facts:         Vec<Fact>,
    outcome:       Outcome,
    group_indices: BTreeSet<u64>,
}

impl Summary {
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Checks whether the path may approve the transaction.
    #[must_use]
    pub fn approves(&self) -> bool {
        self.outcome == Outcome::Approve
    }

    /// Gets the absolute group indices accessed along the path.
    #[must_use]
    pub fn group_indices(&self) -> &BTreeSet<u64> {
        &self.group_indices
    }

    /// Checks whether any fact along the path satisfies `predicate`.
    pub fn requires(&self, predicate: impl Fn(&Condition) -> bool) -> bool {
        self.facts.iter().any(|f| predicate(&f.condition))
    }

    /// Checks whether the facts along the path allow `subject` to be equal to
    /// `constant`.
    #[must_use]
    pub fn may_equal(&self, subject: &Value, constant: u64) -> bool {
        !self.facts.iter().any(|f| f.condition.rules_out(subject, constant))
    }

    /// Checks whether any fact along the path constrains `subject`.
    #[must_use]
    pub fn constrains(&self, subject: &Value) -> bool {
        self.facts.iter().any(|f| f.condition.mentions(subject))
    }
}

/// Evaluates the instructions along `path`.
#[must_use]
pub fn evaluate(contract: &Contract, path: &Path) -> Summary {
    let blocks = path.blocks();
    let mut evaluator = Evaluator::new(contract);
    for (index, block) in blocks.iter().enumerate() {
        evaluator.block(*block, blocks.get(index + 1).copied());
        if evaluator.outcome.is_some() {
            break;
        }
    }
    if path.is_truncated() && evaluator.outcome.is_none() {
        evaluator.outcome = Some(Outcome::Unfinished);
    }
    evaluator.finish()
}

/// Evaluates the single block `block` in isolation, as if control then passed
/// to `next`, and returns the conditions established along the way.
///
/// The stack at the start of the block is unknown, so the result is a subset of
/// what would be found by evaluating any path through the block.
#[must_use]
pub fn block_conditions(contract: &Contract, block: BlockId, next: Option<BlockId>) -> Vec<Condition> {
    let mut evaluator = Evaluator::new(contract);
    evaluator.block(block, next);
    if next.is_none() && evaluator.outcome.is_none() {
        evaluator.conclude();
    }
    evaluator.facts.into_iter().map(|f| f.condition).collect()
}

/// Evaluates `block` in isolation and checks whether it can never approve.
#[must_use]
pub fn block_rejects(contract: &Contract, block: BlockId) -> bool {
    let mut evaluator = Evaluator::new(contract);
    evaluator.block(block, None);
    evaluator.finish().outcome == Outcome::Reject
}

/// The abstract machine state during evaluation.
#[derive(Debug)]
struct Evaluator<'a> {
    contract:       &'a Contract,
    stack:          Vec<Value>,
    scratch:        BTreeMap<u64, Value>,
    int_constants:  Vec<u64>,
    byte_constants: Vec<Value>,
    facts:          Vec<Fact>,
    group_indices:  BTreeSet<u64>,
    outcome:        Option<Outcome>,
    last:           Option<&'a Instruction>,
}

impl<'a> Evaluator<'a> {
    fn new(contract: &'a Contract) -> Self {
        Self {
            contract,
            stack: Vec::new(),
            scratch: BTreeMap::new(),
            int_constants: Vec::new(),
            byte_constants: Vec::new(),
            facts: Vec::new(),
            group_indices: BTreeSet::new(),
            outcome: None,
            last: None,
        }
    }

    /// Evaluates every instruction of `id`, knowing that control passes to
    /// `next` afterwards.
    fn block(&mut self, id: BlockId, next: Option<BlockId>) {
        let Some(block) = self.contract.block(id) else {
            return;
        };
        for instruction in block.instructions() {
            self.last = Some(instruction);
            self.step(instruction, id, next);
            if self.outcome.is_some() {
                return;
            }
        }
    }

    fn finish(mut self) -> Summary {
        if self.outcome.is_none() {
            self.conclude();
        }
        Summary {
            facts:         self.facts,
            outcome:       self.outcome.unwrap_or(Outcome::Approve),
            group_indices: self.group_indices,
        }
    }

    /// Concludes a path that ran off the end of the code without an explicit
    /// `return`.
    fn conclude(&mut self) {
        let Some(last) = self.last else {
            self.outcome = Some(Outcome::Reject);
            return;
        };
        if last.opcode() == Opcode::Retsub {
            // Returning with no caller is a runtime failure.
            self.outcome = Some(Outcome::Reject);
            return;
        }
        let line = last.line();
        let block = self
            .contract
            .cfg()
            .block_containing_line(line)
            .unwrap_or_default();
        let value = self.pop();
        self.approve_if(value, block, line);
    }

    fn approve_if(&mut self, value: Value, block: BlockId, line: u32) {
        self.assume(value, true, block, line);
        if self.outcome.is_none() {
            self.outcome = Some(Outcome::Approve);
        }
    }

    /// Records that `value` must be `holds` for execution to continue.
    fn assume(&mut self, value: Value, holds: bool, block: BlockId, line: u32) {
        match value {
            Value::Uint(v) => {
                if (v != 0) != holds {
                    self.outcome = Some(Outcome::Reject);
                }
            }
            Value::Unknown => (),
            value => self.facts.push(Fact {
                condition: Condition::new(value, holds),
                block,
                line,
            }),
        }
    }

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::Unknown)
    }

    fn pop_n(&mut self, count: usize) {
        for _ in 0..count {
            self.pop();
        }
    }

    /// Pads the bottom of the stack with unknown values until it holds at least
    /// `depth` items.
    ///
    /// The modelled stack is only the known top of the real one, so an
    /// instruction that reaches below it must not move known values closer to
    /// the top than they really are.
    fn ensure_depth(&mut self, depth: usize) {
        let missing = depth.saturating_sub(self.stack.len());
        self.stack.splice(0..0, iter::repeat(Value::Unknown).take(missing));
    }

    /// Gets a reference to the item `depth` places below the top of the stack.
    fn peek(&self, depth: usize) -> Value {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .and_then(|i| self.stack.get(i))
            .cloned()
            .unwrap_or(Value::Unknown)
    }

    #[allow(clippy::too_many_lines)] // One arm per interesting opcode
    fn step(&mut self, instruction: &Instruction, block: BlockId, next: Option<BlockId>) {
        let line = instruction.line();
        let depth = instruction.uint().and_then(|d| usize::try_from(d).ok()).unwrap_or(0);

        match instruction.opcode() {
            Opcode::Label | Opcode::Callsub | Opcode::Retsub | Opcode::Proto => (),
            Opcode::Int | Opcode::Pushint => self.push(instruction.uint().map_or(Value::Unknown, Value::Uint)),
            Opcode::Pushints => {
                for v in instruction.uints() {
                    self.push(Value::Uint(v));
                }
            }
            Opcode::Byte | Opcode::Pushbytes => self.push(bytes_immediate(instruction)),
            Opcode::Pushbytess => {
                for imm in instruction.immediates() {
                    if let Immediate::Bytes(b) = imm {
                        self.push(Value::Bytes(b.clone()));
                    }
                }
            }
            Opcode::Addr => self.push(match instruction.immediates().first() {
                Some(Immediate::Address(a)) => Value::Address(a.clone()),
                _ => Value::Unknown,
            }),
            Opcode::Intcblock => self.int_constants = instruction.uints(),
            Opcode::Intc => self.push_int_constant(depth),
            Opcode::Intc0 => self.push_int_constant(0),
            Opcode::Intc1 => self.push_int_constant(1),
            Opcode::Intc2 => self.push_int_constant(2),
            Opcode::Intc3 => self.push_int_constant(3),
            Opcode::Bytecblock => {
                self.byte_constants = instruction
                    .immediates()
                    .iter()
                    .filter_map(|imm| match imm {
                        Immediate::Bytes(b) => Some(Value::Bytes(b.clone())),
                        _ => None,
                    })
                    .collect();
            }
            Opcode::Bytec => self.push_byte_constant(depth),
            Opcode::Bytec0 => self.push_byte_constant(0),
            Opcode::Bytec1 => self.push_byte_constant(1),
            Opcode::Bytec2 => self.push_byte_constant(2),
            Opcode::Bytec3 => self.push_byte_constant(3),
            Opcode::Txn => self.push(match instruction.transaction_field() {
                Some(field) if !field.is_array() => Value::Txn(field),
                _ => Value::Unknown,
            }),
            Opcode::Gtxn => {
                let index = instruction.uint();
                self.group_indices.extend(index);
                self.push(match instruction.transaction_field() {
                    Some(field) if !field.is_array() => Value::GroupTxn { index, field },
                    _ => Value::Unknown,
                });
            }
            Opcode::Gtxna | Opcode::Gload | Opcode::Gaid => {
                self.group_indices.extend(instruction.uint());
                self.push(Value::Unknown);
            }
            Opcode::Gtxnas => {
                self.group_indices.extend(instruction.uint());
                self.pop();
                self.push(Value::Unknown);
            }
            Opcode::Gtxns => {
                let index = self.pop();
                let value = match instruction.transaction_field() {
                    Some(field) if !field.is_array() => match index {
                        Value::Txn(TransactionField::GroupIndex) => Value::Txn(field),
                        Value::Uint(i) => {
                            self.group_indices.insert(i);
                            Value::GroupTxn {
                                index: Some(i),
                                field,
                            }
                        }
                        _ => Value::GroupTxn { index: None, field },
                    },
                    _ => Value::Unknown,
                };
                self.push(value);
            }
            Opcode::Global => self.push(instruction.global_field().map_or(Value::Unknown, Value::Global)),
            Opcode::AppGlobalGet => {
                let key = self.pop();
                self.push(Value::GlobalState(Box::new(key)));
            }
            Opcode::Load => {
                let value = instruction
                    .uint()
                    .and_then(|slot| self.scratch.get(&slot).cloned())
                    .unwrap_or(Value::Unknown);
                self.push(value);
            }
            Opcode::Store => {
                let value = self.pop();
                if let Some(slot) = instruction.uint() {
                    self.scratch.insert(slot, value);
                }
            }
            Opcode::Loads => {
                let value = match self.pop() {
                    Value::Uint(slot) => self.scratch.get(&slot).cloned().unwrap_or(Value::Unknown),
                    _ => Value::Unknown,
                };
                self.push(value);
            }
            Opcode::Stores => {
                let value = self.pop();
                match self.pop() {
                    Value::Uint(slot) => {
                        self.scratch.insert(slot, value);
                    }
                    _ => self.scratch.clear(),
                }
            }
            op @ (Opcode::Eq | Opcode::Ne | Opcode::Lt | Opcode::Gt | Opcode::Le | Opcode::Ge) => {
                let right = self.pop();
                let left = self.pop();
                let value = Comparison::from_opcode(op)
                    .map_or(Value::Unknown, |cmp| Value::compare(cmp, left, right));
                self.push(value);
            }
            Opcode::And => {
                let right = self.pop();
                let left = self.pop();
                self.push(Value::and(left, right));
            }
            Opcode::Or => {
                let right = self.pop();
                let left = self.pop();
                self.push(Value::or(left, right));
            }
            Opcode::Not => {
                let value = self.pop();
                self.push(Value::not(value));
            }
            Opcode::Pop => {
                self.pop();
            }
            Opcode::Popn => self.pop_n(depth),
            Opcode::Dup => {
                let top = self.peek(0);
                self.push(top);
            }
            Opcode::Dupn => {
                let top = self.peek(0);
                for _ in 0..depth {
                    self.push(top.clone());
                }
            }
            Opcode::Dup2 => {
                let (a, b) = (self.peek(1), self.peek(0));
                self.push(a);
                self.push(b);
            }
            Opcode::Swap => {
                let b = self.pop();
                let a = self.pop();
                self.push(b);
                self.push(a);
            }
            Opcode::Dig => {
                let value = self.peek(depth);
                self.push(value);
            }
            Opcode::Bury => {
                let value = self.pop();
                self.ensure_depth(depth);
                if let Some(index) = self.stack.len().checked_sub(depth) {
                    if let Some(slot) = self.stack.get_mut(index) {
                        *slot = value;
                    }
                }
            }
            Opcode::Cover => {
                let value = self.pop();
                self.ensure_depth(depth);
                let index = self.stack.len() - depth;
                self.stack.insert(index, value);
            }
            Opcode::Uncover => {
                let value = match self.stack.len().checked_sub(depth + 1) {
                    Some(index) => self.stack.remove(index),
                    None => Value::Unknown,
                };
                self.push(value);
            }
            Opcode::Select => {
                let condition = self.pop();
                let if_true = self.pop();
                let if_false = self.pop();
                self.push(match condition.as_uint() {
                    Some(0) => if_false,
                    Some(_) => if_true,
                    None => Value::Unknown,
                });
            }
            Opcode::Assert => {
                let value = self.pop();
                self.assume(value, true, block, line);
            }
            Opcode::Bz | Opcode::Bnz => {
                let value = self.pop();
                let taken_holds = instruction.opcode() == Opcode::Bnz;
                if let Some(direction) = self.direction(instruction, block, next) {
                    let holds = if direction { taken_holds } else { !taken_holds };
                    self.assume(value, holds, block, line);
                }
            }
            Opcode::Switch => {
                let value = self.pop();
                self.switch(instruction, value, block, next);
            }
            Opcode::Match => {
                let targets = instruction.labels().len();
                self.pop_n(targets + 1);
            }
            Opcode::Return => {
                let value = self.pop();
                self.approve_if(value, block, line);
            }
            Opcode::Err => self.outcome = Some(Outcome::Reject),
            op => match op.stack_effect() {
                StackEffect::Fixed { pops, pushes } => {
                    self.pop_n(usize::from(pops));
                    for _ in 0..pushes {
                        self.push(Value::Unknown);
                    }
                }
                StackEffect::Dynamic => self.stack.clear(),
            },
        }
    }

    /// Works out whether the conditional branch `instruction` at the end of
    /// `block` was taken, given that control moved to `next`.
    fn direction(&self, instruction: &Instruction, block: BlockId, next: Option<BlockId>) -> Option<bool> {
        let next = next?;
        let cfg = self.contract.cfg();
        let target = cfg.block_for_label(instruction.labels().first()?)?;
        let fallthrough = BlockId::new(block.index() + 1);
        if target == fallthrough {
            return None;
        }
        if next == target {
            Some(true)
        } else if next == fallthrough {
            Some(false)
        } else {
            None
        }
    }

    /// Records what a `switch` on `value` implies about it given that control
    /// moved to `next`.
    fn switch(&mut self, instruction: &Instruction, value: Value, block: BlockId, next: Option<BlockId>) {
        let Some(next) = next else { return };
        let cfg = self.contract.cfg();
        let targets: Vec<Option<BlockId>> = instruction
            .labels()
            .iter()
            .map(|label| cfg.block_for_label(label))
            .collect();
        let fallthrough = BlockId::new(block.index() + 1);
        let line = instruction.line();

        if next == fallthrough && !targets.contains(&Some(fallthrough)) {
            let count = targets.len() as u64;
            self.assume(
                Value::compare(Comparison::Ge, value, Value::Uint(count)),
                true,
                block,
                line,
            );
            return;
        }
        if next == fallthrough {
            return;
        }

        let taken = targets
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Some(next))
            .map(|(i, _)| Value::compare(Comparison::Eq, value.clone(), Value::Uint(i as u64)))
            .reduce(Value::or);
        if let Some(condition) = taken {
            self.assume(condition, true, block, line);
        }
    }

    fn push_int_constant(&mut self, index: usize) {
        let value = self
            .int_constants
            .get(index)
            .copied()
            .map_or(Value::Unknown, Value::Uint);
        self.push(value);
    }

    fn push_byte_constant(&mut self, index: usize) {
        let value = self.byte_constants.get(index).cloned().unwrap_or(Value::Unknown);
        self.push(value);
    }
}

fn bytes_immediate(instruction: &Instruction) -> Value {
    match instruction.immediates().first() {
        Some(Immediate::Bytes(b)) => Value::Bytes(b.clone()),
        _ => Value::Unknown,
    }
}
