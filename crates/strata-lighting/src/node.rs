//! BFS work items and the reusable queues that hold them.

/// A pending light update.
///
/// `x` and `z` are relative to the chunk being lit and may leave `0..16`
/// during spreading, where they address one of the eight neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightNode {
    pub x: i8,
    pub z: i8,
    pub y: u8,
    /// Level of the cell the light comes from; the destination applies its
    /// own filter on top of the one-level step.
    pub level: u8,
    /// Seed nodes already hold their level; they propagate without being
    /// re-tested against the cell they sit on.
    pub first: bool,
}

impl LightNode {
    /// A seed node at an already-lit cell.
    pub fn seed(x: i8, y: u8, z: i8, level: u8) -> Self {
        Self {
            x,
            z,
            y,
            level,
            first: true,
        }
    }
}

/// The six axis directions, in default visit order.
const DIRECTIONS: [(i8, i8, i8); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

fn check_visit_order(order: &[usize; 6]) {
    let mut seen = [false; 6];
    for &i in order {
        assert!(i < 6 && !seen[i], "visit order {order:?} is not a permutation of 0..6");
        seen[i] = true;
    }
}

/// FIFO of [`LightNode`]s backed by a vector and a read cursor.
///
/// Reset between uses so the allocation is kept. Also owns the scratch
/// buffer for a node's axis neighbours.
#[derive(Clone, Debug)]
pub struct NodeQueue {
    nodes: Vec<LightNode>,
    head: usize,
    scratch: [LightNode; 6],
    order: [usize; 6],
}

impl NodeQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: 0,
            scratch: [LightNode::default(); 6],
            order: [0, 1, 2, 3, 4, 5],
        }
    }

    /// Sets the order in which neighbours are enqueued. `order` must be a
    /// permutation of `0..6` indexing +X, -X, +Y, -Y, +Z, -Z.
    ///
    /// # Panics
    ///
    /// Panics if `order` is not a permutation.
    pub fn set_visit_order(&mut self, order: [usize; 6]) {
        check_visit_order(&order);
        self.order = order;
    }

    pub fn push_back(&mut self, node: LightNode) {
        self.nodes.push(node);
    }

    pub fn pop_front(&mut self) -> Option<LightNode> {
        let node = self.nodes.get(self.head).copied()?;
        self.head += 1;
        Some(node)
    }

    /// Number of nodes not yet popped.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total nodes pushed since the last reset.
    pub fn pushed(&self) -> usize {
        self.nodes.len()
    }

    /// Empties the queue, keeping its allocation.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.head = 0;
    }

    /// Enqueues the axis neighbours of `(x, y, z)` carrying `level`.
    /// Neighbours below y=0 or above y=255 are skipped.
    pub fn push_neighbours(&mut self, x: i8, y: u8, z: i8, level: u8) {
        let mut count = 0;
        for &dir in &self.order {
            let (dx, dy, dz) = DIRECTIONS[dir];
            let Some(ny) = y.checked_add_signed(dy) else {
                continue;
            };
            self.scratch[count] = LightNode {
                x: x + dx,
                z: z + dz,
                y: ny,
                level,
                first: false,
            };
            count += 1;
        }
        self.nodes.extend_from_slice(&self.scratch[..count]);
    }
}

impl Default for NodeQueue {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// Free list of [`NodeQueue`]s reused across fill and spread calls.
#[derive(Debug)]
pub struct QueuePool {
    free: Vec<NodeQueue>,
    max_free: usize,
    capacity: usize,
    visit_order: [usize; 6],
    allocated: usize,
    reused: usize,
}

impl QueuePool {
    /// Creates a pool keeping at most `max_free` idle queues, each new queue
    /// reserving room for `capacity` nodes.
    pub fn new(max_free: usize, capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_free),
            max_free,
            capacity,
            visit_order: [0, 1, 2, 3, 4, 5],
            allocated: 0,
            reused: 0,
        }
    }

    /// Visit order applied to every queue handed out.
    pub fn set_visit_order(&mut self, order: [usize; 6]) {
        check_visit_order(&order);
        self.visit_order = order;
    }

    /// Takes an empty queue, reusing an idle one when available.
    pub fn acquire(&mut self) -> NodeQueue {
        let mut queue = match self.free.pop() {
            Some(queue) => {
                self.reused += 1;
                queue
            }
            None => {
                self.allocated += 1;
                NodeQueue::with_capacity(self.capacity)
            }
        };
        queue.reset();
        queue.set_visit_order(self.visit_order);
        queue
    }

    /// Returns a queue to the pool. Dropped if the pool is full.
    pub fn release(&mut self, mut queue: NodeQueue) {
        if self.free.len() < self.max_free {
            queue.reset();
            self.free.push(queue);
        }
    }

    /// Number of idle queues.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Queues created because none were idle.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Queues handed out from the free list.
    pub fn reused(&self) -> usize {
        self.reused
    }
}

impl Default for QueuePool {
    fn default() -> Self {
        Self::new(4, 4096)
    }
}
