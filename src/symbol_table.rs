//! Flat symbol table mapping names to declared types.
//!
//! There is no lexical scoping: every declaration of a compilation unit lands in the same
//! table. Inserting a name that is already present prepends a new entry to its chain, so
//! lookups see the most recent declaration and older ones stay shadowed behind it.

use std::fmt;

use crate::ast::{DataType, Node, NodeKind};

/// Number of hash buckets. Prime, comfortably above the symbol count of a typical unit.
pub const BUCKET_COUNT: usize = 211;

/// Largest edit distance at which [SymbolTable::suggest] still offers a name.
const SUGGESTION_DISTANCE: usize = 2;

pub struct Symbol {
    name: String,
    data_type: DataType,
    next: Option<Box<Symbol>>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish()
    }
}

/// Iterator over a single bucket chain, newest entry first.
pub struct Chain<'a> {
    current: Option<&'a Symbol>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Symbol;

    fn next(&mut self) -> Option<&'a Symbol> {
        let symbol = self.current?;
        self.current = symbol.next.as_deref();
        Some(symbol)
    }
}

pub struct SymbolTable {
    buckets: Vec<Option<Box<Symbol>>>,
    len: usize,
}

/// The "multiply by 33, add byte" string hash, reduced to a bucket index.
fn hash(name: &str) -> usize {
    let hash = name
        .bytes()
        .fold(5381u64, |hash, byte| hash.wrapping_mul(33).wrapping_add(byte as u64));

    (hash % BUCKET_COUNT as u64) as usize
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            buckets: (0..BUCKET_COUNT).map(|_| None).collect(),
            len: 0,
        }
    }

    /// Returns the index of the bucket `name` hashes into.
    pub fn bucket_index(name: &str) -> usize {
        hash(name)
    }

    /// Adds `name` in front of its bucket chain. Never overwrites an existing entry.
    pub fn insert(&mut self, name: &str, data_type: DataType) {
        let bucket = &mut self.buckets[hash(name)];

        let symbol = Box::new(Symbol {
            name: name.to_string(),
            data_type,
            next: bucket.take(),
        });

        *bucket = Some(symbol);
        self.len += 1;
    }

    /// Finds the most recently inserted entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.bucket(hash(name)).find(|symbol| symbol.name == name)
    }

    /// Iterates the chain of the bucket at `index`, newest entry first.
    pub fn bucket(&self, index: usize) -> Chain {
        Chain {
            current: self.buckets.get(index).and_then(|head| head.as_deref()),
        }
    }

    /// Iterates every entry, shadowed ones included, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        (0..BUCKET_COUNT).flat_map(move |index| self.bucket(index))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frees every chain in every bucket.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            let mut current = bucket.take();

            // Unlink one entry at a time so long chains don't recurse on drop.
            while let Some(mut symbol) = current {
                current = symbol.next.take();
            }
        }

        self.len = 0;
    }

    /// Returns the declared name closest to `name`, if one is close enough to be a likely typo.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        self.iter()
            .map(|symbol| (edit_distance::edit_distance(name, &symbol.name), &symbol.name))
            .filter(|(distance, _)| *distance > 0 && *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name.as_str())
    }

    /// Inserts every declaration and function definition found in `root`, in source order.
    pub fn declare(&mut self, root: &Node) {
        match root.kind {
            NodeKind::Decl | NodeKind::FuncDef => {
                if let (Some(name), Some(data_type)) = (&root.value, root.data_type) {
                    self.insert(name, data_type);
                }
            }
            _ => (),
        }

        for child in &root.children {
            self.declare(child);
        }
    }
}

impl Clone for SymbolTable {
    /// Copies every chain entry by entry, keeping the shadowing order.
    fn clone(&self) -> SymbolTable {
        let mut table = SymbolTable::new();

        for index in 0..BUCKET_COUNT {
            let chain = self.bucket(index).collect::<Vec<_>>();

            for symbol in chain.into_iter().rev() {
                table.insert(&symbol.name, symbol.data_type);
            }
        }

        table
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

impl Drop for SymbolTable {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "(empty)");
        }

        for symbol in self.iter() {
            writeln!(f, "{:<12} | {}", symbol.name, symbol.data_type)?;
        }

        Ok(())
    }
}
