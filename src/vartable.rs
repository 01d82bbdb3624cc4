use crate::common::{HashMap, Level, VarId};

/// Bidirectional variable map.
///
/// New variables always append at the deepest level; registering an
/// existing id is idempotent and returns the existing level.
#[derive(Default)]
pub struct VarTable {
    id2level: HashMap<VarId, Level>,
    level2id: Vec<VarId>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_var(&mut self, varid: VarId) -> Level {
        if let Some(&level) = self.id2level.get(&varid) {
            return level;
        }
        let level = self.level2id.len() as Level;
        self.id2level.insert(varid, level);
        self.level2id.push(varid);
        level
    }

    #[inline]
    pub fn level(&self, varid: VarId) -> Option<Level> {
        self.id2level.get(&varid).copied()
    }

    #[inline]
    pub fn varid(&self, level: Level) -> Option<VarId> {
        self.level2id.get(level as usize).copied()
    }

    #[inline]
    pub fn var_num(&self) -> usize {
        self.level2id.len()
    }

    /// Registered variables in ascending level order.
    pub fn var_list(&self) -> Vec<VarId> {
        self.level2id.clone()
    }
}
