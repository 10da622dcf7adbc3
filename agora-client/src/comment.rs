use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};

use crate::api::{Comment, CommentId, Error};

/// In what order siblings are visited
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingOrder {
    /// Siblings are pushed oldest-first onto the walk stack, and thus show
    /// up newest-first
    #[default]
    Stacked,

    /// Siblings show up oldest-first
    Chronological,
}

impl FromStr for SiblingOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<SiblingOrder, Error> {
        match s {
            "stacked" => Ok(SiblingOrder::Stacked),
            "chronological" => Ok(SiblingOrder::Chronological),
            _ => Err(Error::Validation(format!("unknown comment order {s:?}"))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentEntry {
    pub comment: Comment,

    /// Number of ancestors
    pub depth: usize,
}

/// A thread's comments, flattened in display order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    pub entries: Vec<CommentEntry>,

    /// Comments not reachable from any top-level comment: dangling parent
    /// or parent cycle
    pub orphans: Vec<Comment>,
}

impl CommentTree {
    pub fn build(comments: &[Comment], order: SiblingOrder) -> CommentTree {
        let mut sorted = comments.iter().collect::<Vec<_>>();
        sorted.sort_by_key(|c| c.created_at);

        let mut roots = Vec::new();
        let mut children = HashMap::<CommentId, Vec<&Comment>>::new();
        for c in sorted {
            match c.parent_comment_id {
                None => roots.push(c),
                Some(p) => children.entry(p).or_default().push(c),
            }
        }
        if order == SiblingOrder::Chronological {
            roots.reverse();
            for v in children.values_mut() {
                v.reverse();
            }
        }

        let mut entries = Vec::with_capacity(comments.len());
        let mut visited = HashSet::new();
        let mut stack = roots.into_iter().map(|c| (c, 0)).collect::<Vec<_>>();
        while let Some((c, depth)) = stack.pop() {
            if !visited.insert(c.id) {
                continue;
            }
            entries.push(CommentEntry {
                comment: c.clone(),
                depth,
            });
            if let Some(kids) = children.get(&c.id) {
                stack.extend(kids.iter().map(|k| (*k, depth + 1)));
            }
        }

        let orphans = comments
            .iter()
            .filter(|c| !visited.contains(&c.id))
            .cloned()
            .collect::<Vec<_>>();
        for o in orphans.iter() {
            tracing::warn!(
                comment = %o.id,
                parent = ?o.parent_comment_id,
                "comment is not reachable from any top-level comment"
            );
        }

        CommentTree { entries, orphans }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        self.entries
            .iter()
            .map(|e| &e.comment)
            .find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::api::{ThreadId, UserId};

    fn comment(id: u64, parent: Option<u64>, t: i64) -> Comment {
        Comment {
            id: CommentId(id),
            thread_id: ThreadId(1),
            parent_comment_id: parent.map(CommentId),
            creator_id: UserId(1),
            content: format!("comment {id}"),
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
            likes: Vec::new(),
        }
    }

    fn shape(tree: &CommentTree) -> Vec<(u64, usize)> {
        tree.entries
            .iter()
            .map(|e| (e.comment.id.0, e.depth))
            .collect()
    }

    #[test]
    fn reply_follows_its_parent() {
        let input = [
            comment(1, None, 10),
            comment(2, Some(1), 20),
            comment(3, None, 5),
        ];
        let tree = CommentTree::build(&input, SiblingOrder::Stacked);
        assert_eq!(shape(&tree), vec![(1, 0), (2, 1), (3, 0)]);
        assert!(tree.orphans.is_empty());

        let tree = CommentTree::build(&input, SiblingOrder::Chronological);
        assert_eq!(shape(&tree), vec![(3, 0), (1, 0), (2, 1)]);
    }

    #[test]
    fn siblings_order() {
        let input = [
            comment(1, None, 0),
            comment(2, Some(1), 30),
            comment(3, Some(1), 10),
            comment(4, Some(1), 20),
            comment(5, Some(3), 40),
        ];
        assert_eq!(
            shape(&CommentTree::build(&input, SiblingOrder::Stacked)),
            vec![(1, 0), (2, 1), (4, 1), (3, 1), (5, 2)]
        );
        assert_eq!(
            shape(&CommentTree::build(&input, SiblingOrder::Chronological)),
            vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 1)]
        );
    }

    #[test]
    fn dangling_parent_is_orphaned() {
        let input = [comment(1, None, 0), comment(2, Some(99), 1)];
        let tree = CommentTree::build(&input, SiblingOrder::Stacked);
        assert_eq!(shape(&tree), vec![(1, 0)]);
        assert_eq!(tree.orphans, vec![input[1].clone()]);
        assert!(tree.find(CommentId(2)).is_none());
    }

    #[test]
    fn cycles_and_duplicates_terminate() {
        let input = [
            comment(1, Some(2), 0),
            comment(2, Some(1), 1),
            comment(3, None, 2),
            comment(3, None, 2),
        ];
        let tree = CommentTree::build(&input, SiblingOrder::Stacked);
        assert_eq!(shape(&tree), vec![(3, 0)]);
        assert_eq!(tree.orphans.len(), 2);
    }

    fn time_of(t: u16) -> i64 {
        i64::from(t)
    }

    #[test]
    fn valid_forest_is_fully_laid_out() {
        // Each comment may only point to an earlier one, so the input is a
        // forest
        bolero::check!()
            .with_type::<Vec<(Option<u8>, u16)>>()
            .cloned()
            .for_each(|raw| {
                let input = raw
                    .iter()
                    .enumerate()
                    .map(|(i, (parent, t))| {
                        let parent = parent
                            .filter(|_| i > 0)
                            .map(|p| (usize::from(p) % i) as u64);
                        comment(i as u64, parent, time_of(*t))
                    })
                    .collect::<Vec<_>>();
                let tree = CommentTree::build(&input, SiblingOrder::Stacked);
                assert!(tree.orphans.is_empty());
                assert_eq!(tree.len(), input.len());

                let by_id = input
                    .iter()
                    .map(|c| (c.id, c))
                    .collect::<HashMap<_, _>>();
                for e in tree.entries.iter() {
                    let mut ancestors = 0;
                    let mut cur = e.comment.parent_comment_id;
                    while let Some(p) = cur {
                        ancestors += 1;
                        cur = by_id[&p].parent_comment_id;
                    }
                    assert_eq!(e.depth, ancestors);
                }

                assert_eq!(tree, CommentTree::build(&input, SiblingOrder::Stacked));
            })
    }

    #[test]
    fn arbitrary_parents_never_lose_comments() {
        bolero::check!()
            .with_type::<Vec<(u8, Option<u8>, u16)>>()
            .cloned()
            .for_each(|raw| {
                let mut seen = HashSet::new();
                let input = raw
                    .into_iter()
                    .filter(|(id, _, _)| seen.insert(*id))
                    .map(|(id, parent, t)| {
                        comment(u64::from(id), parent.map(u64::from), time_of(t))
                    })
                    .collect::<Vec<_>>();
                for order in [SiblingOrder::Stacked, SiblingOrder::Chronological] {
                    let tree = CommentTree::build(&input, order);
                    assert_eq!(tree.entries.len() + tree.orphans.len(), input.len());
                    for (i, e) in tree.entries.iter().enumerate() {
                        match e.comment.parent_comment_id {
                            None => assert_eq!(e.depth, 0),
                            Some(p) => {
                                // The parent is the closest preceding entry one
                                // level up
                                let parent = tree.entries[..i]
                                    .iter()
                                    .rev()
                                    .find(|o| o.depth + 1 == e.depth)
                                    .expect("child without a preceding parent");
                                assert_eq!(parent.comment.id, p);
                            }
                        }
                    }
                }
            })
    }
}
