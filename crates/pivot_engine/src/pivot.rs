use std::collections::HashMap;

use models::{AggregateBucket, OperationType, PivotData, Totals, TransactionRecord, ViewType};

use crate::dataset::Dataset;

/// A bucket under construction. Children live in a Vec so that they keep
/// the order their key was first seen; the index map makes the
/// lookup-or-insert step O(1) per level.
#[derive(Debug, Default)]
struct BucketNode {
    totals: Totals,
    children: Vec<(String, BucketNode)>,
    index: HashMap<String, usize>,
}

impl BucketNode {
    fn child_mut(&mut self, key: &str) -> &mut BucketNode {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.children.len();
                self.children.push((key.to_owned(), BucketNode::default()));
                self.index.insert(key.to_owned(), idx);
                idx
            }
        };
        &mut self.children[idx].1
    }

    fn freeze(self) -> Vec<AggregateBucket> {
        self.children
            .into_iter()
            .map(|(key, node)| AggregateBucket {
                key,
                subtotals: node.totals.clone(),
                children: node.freeze(),
            })
            .collect()
    }
}

/// Build the three-level pivot tree for one operation type and view.
///
/// Every matching record is accumulated into the grand total and into
/// the bucket at each level of its key path, so a parent's subtotals
/// always equal the element-wise sum of its children's. Records with a
/// missing grouping value land in an empty-string bucket rather than
/// being dropped. An empty filtered set yields empty groups and zero
/// totals.
pub fn pivot(
    dataset: &Dataset,
    op: OperationType,
    view: ViewType,
    currency: Option<&str>,
) -> PivotData {
    let mut root = BucketNode::default();

    for record in dataset.filtered(op, currency) {
        root.totals.add_record(record);
        accumulate(&mut root, view.key_path(record), record);
    }

    PivotData {
        totals: root.totals.clone(),
        groups: root.freeze(),
    }
}

fn accumulate(root: &mut BucketNode, keys: [&str; 3], record: &TransactionRecord) {
    let mut node = root;
    for key in keys {
        node = node.child_mut(key);
        node.totals.add_record(record);
    }
}
