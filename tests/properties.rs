use std::collections::VecDeque;

use proptest::prelude::*;
use rdeque::{Deque, Pool, PoolConfig};

#[derive(Debug, Clone)]
enum Op {
  PushBack(i32),
  PushFront(i32),
  PopBack,
  PopFront,
  Insert(usize, i32),
  InsertN(usize, usize, i32),
  Erase(usize),
  EraseRange(usize, usize),
  Truncate(usize),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    4 => any::<i32>().prop_map(Op::PushBack),
    4 => any::<i32>().prop_map(Op::PushFront),
    2 => Just(Op::PopBack),
    2 => Just(Op::PopFront),
    2 => (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Insert(at, v)),
    1 => (any::<usize>(), 0usize..300, any::<i32>()).prop_map(|(at, n, v)| Op::InsertN(at, n, v)),
    2 => any::<usize>().prop_map(Op::Erase),
    1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::EraseRange(a, b)),
    1 => any::<usize>().prop_map(Op::Truncate),
  ]
}

fn apply(
  deque: &mut Deque<i32>,
  model: &mut VecDeque<i32>,
  op: Op,
) {
  let len = model.len();

  match op {
    Op::PushBack(v) => {
      deque.push_back(v);
      model.push_back(v);
    }
    Op::PushFront(v) => {
      deque.push_front(v);
      model.push_front(v);
    }
    Op::PopBack => assert_eq!(deque.pop_back(), model.pop_back()),
    Op::PopFront => assert_eq!(deque.pop_front(), model.pop_front()),
    Op::Insert(at, v) => {
      let at = at % (len + 1);
      deque.insert(at, v);
      model.insert(at, v);
    }
    Op::InsertN(at, n, v) => {
      let at = at % (len + 1);
      deque.insert_n(at, n, v);
      for _ in 0..n {
        model.insert(at, v);
      }
    }
    Op::Erase(at) => {
      if len > 0 {
        let at = at % len;
        assert_eq!(deque.erase(at), model.remove(at).unwrap());
      }
    }
    Op::EraseRange(a, b) => {
      let (a, b) = (a % (len + 1), b % (len + 1));
      let (first, last) = (a.min(b), a.max(b));
      deque.erase_range(first..last);
      model.drain(first..last);
    }
    Op::Truncate(n) => {
      let n = n % (len + 1);
      deque.truncate(n);
      model.truncate(n);
    }
  }
}

proptest! {
  #[test]
  fn matches_vecdeque_model(ops in proptest::collection::vec(op(), 1..200)) {
    let pool = Pool::new(PoolConfig::for_deque_blocks()).unwrap();
    let mut deque = Deque::new_in(pool.clone());
    let mut model = VecDeque::new();

    for op in ops {
      apply(&mut deque, &mut model, op);

      prop_assert_eq!(deque.len(), model.len());
      prop_assert_eq!(deque.end() - deque.begin(), model.len() as isize);
      prop_assert_eq!(deque.front(), model.front());
      prop_assert_eq!(deque.back(), model.back());
    }

    prop_assert!(deque.iter().eq(model.iter()));
    prop_assert!(deque.iter().rev().eq(model.iter().rev()));

    drop(deque);
    prop_assert_eq!(pool.stats().outstanding_blocks, 0);
  }

  #[test]
  fn cursor_distance_counts_steps(len in 1usize..2000, from in any::<usize>(), steps in any::<usize>()) {
    let mut deque = Deque::new_in(Pool::new(PoolConfig::for_deque_blocks()).unwrap());
    deque.extend(0..len as u64);

    let from = from % len;
    let steps = steps % (len - from + 1);

    let a = deque.begin() + from as isize;
    let mut b = a;
    for _ in 0..steps {
      b.step_forward();
    }

    prop_assert_eq!(b - a, steps as isize);
    prop_assert_eq!((b - a) + (a - b), 0);
    prop_assert_eq!(a + steps as isize, b);
    prop_assert_eq!(deque.index_of(b), Some(from + steps));

    let mut back = b;
    for _ in 0..steps {
      back.step_back();
    }
    prop_assert_eq!(back, a);
  }

  #[test]
  fn indexing_agrees_with_iteration(front in 0usize..600, back in 0usize..600) {
    let mut deque = Deque::new_in(Pool::new(PoolConfig::for_deque_blocks()).unwrap());
    for i in 0..back {
      deque.push_back(i as i64);
    }
    for i in 1..=front {
      deque.push_front(-(i as i64));
    }

    for (index, value) in deque.iter().enumerate() {
      prop_assert_eq!(deque[index], *value);
      prop_assert_eq!(deque.cursor_get(deque.begin() + index as isize), Some(value));
    }
    prop_assert!(deque.at(front + back).is_err());
  }
}
