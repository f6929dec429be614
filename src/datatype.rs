//! The narrow slice of an alignment data type the models consume: how many
//! true states exist, how many observed codes the alignment may contain, and
//! which true states each observed code is compatible with.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeKind {
    Binary,
    Ternary,
    NucleotideDiploid16,
}

pub trait StateCapability {
    fn kind(&self) -> DataTypeKind;

    fn description(&self) -> &str;

    fn state_count(&self) -> usize;

    /// Length of the code-to-state-set table (concrete states plus ambiguity codes).
    fn observed_code_count(&self) -> usize;

    /// Membership flags over true states for one observed code, `None` past
    /// the end of the code table.
    fn state_set(&self, observed_code: usize) -> Option<&[bool]>;
}

#[derive(Debug, Clone)]
pub struct DataType {
    kind: DataTypeKind,
    description: String,
    state_count: usize,
    code_sets: Vec<Vec<bool>>,
}

impl DataType {
    /// One code per concrete state followed by a single fully ambiguous `?` code.
    fn with_missing_code(kind: DataTypeKind, description: &str, state_count: usize) -> Self {
        let mut code_sets = Vec::with_capacity(state_count + 1);
        for s in 0..state_count {
            let mut set = vec![false; state_count];
            set[s] = true;
            code_sets.push(set);
        }
        code_sets.push(vec![true; state_count]);
        Self {
            kind,
            description: description.to_string(),
            state_count,
            code_sets,
        }
    }

    pub fn binary() -> Self {
        Self::with_missing_code(DataTypeKind::Binary, "binary", 2)
    }

    /// 0 = homozygous reference, 1 = heterozygous, 2 = homozygous non-reference.
    pub fn ternary() -> Self {
        Self::with_missing_code(DataTypeKind::Ternary, "ternary", 3)
    }

    /// Ordered genotypes `first * 4 + second` over A, C, G, T.
    pub fn nucleotide_diploid16() -> Self {
        Self::with_missing_code(DataTypeKind::NucleotideDiploid16, "nucleotideDiploid16", 16)
    }
}

impl StateCapability for DataType {
    fn kind(&self) -> DataTypeKind {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn state_count(&self) -> usize {
        self.state_count
    }

    fn observed_code_count(&self) -> usize {
        self.code_sets.len()
    }

    fn state_set(&self, observed_code: usize) -> Option<&[bool]> {
        self.code_sets.get(observed_code).map(Vec::as_slice)
    }
}

