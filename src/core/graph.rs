//! 编排图：节点与转移表
//!
//! router 是唯一的条件分支点，其余边都是无条件的；done 没有出边。

use crate::core::state::Intent;

/// 编排图节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Router,
    Order,
    Knowledge,
    Respond,
    Done,
}

impl Node {
    pub const ENTRY: Node = Node::Router;

    pub fn name(&self) -> &'static str {
        match self {
            Node::Router => "router",
            Node::Order => "order",
            Node::Knowledge => "knowledge",
            Node::Respond => "respond",
            Node::Done => "done",
        }
    }

    /// 按转移表取下一个节点；终点返回 None
    pub fn next(self, intent: Intent) -> Option<Node> {
        EDGES
            .iter()
            .find(|edge| edge.from == self && edge.guard.admits(intent))
            .map(|edge| edge.to)
    }
}

/// 边的守卫条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    IntentIs(Intent),
}

impl Guard {
    fn admits(&self, intent: Intent) -> bool {
        match self {
            Guard::Always => true,
            Guard::IntentIs(expected) => *expected == intent,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: Node,
    pub guard: Guard,
    pub to: Node,
}

pub const EDGES: [Edge; 6] = [
    Edge { from: Node::Router, guard: Guard::IntentIs(Intent::Order), to: Node::Order },
    Edge { from: Node::Router, guard: Guard::IntentIs(Intent::Knowledge), to: Node::Knowledge },
    Edge { from: Node::Router, guard: Guard::IntentIs(Intent::Chat), to: Node::Respond },
    Edge { from: Node::Order, guard: Guard::Always, to: Node::Respond },
    Edge { from: Node::Knowledge, guard: Guard::Always, to: Node::Respond },
    Edge { from: Node::Respond, guard: Guard::Always, to: Node::Done },
];

/// 给定意图时从入口走到终点的完整路径
pub fn path_for(intent: Intent) -> Vec<Node> {
    let mut path = vec![Node::ENTRY];
    let mut node = Node::ENTRY;
    while let Some(next) = node.next(intent) {
        path.push(next);
        node = next;
    }
    path
}
