// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2023/09/16 09:47:12

//! The encoder's mirror of the dynamic table. The FIFO of entries is
//! overlaid with a small hash index so that recently added names and
//! (name, value) pairs resolve without scanning the whole table.

use std::{collections::VecDeque, num::Wrapping};

use crate::field::HeaderField;

const BUCKET_COUNT: usize = 17;

#[derive(Debug, Clone)]
struct Entry {
    field: HeaderField,
    hash: usize,
    counter: Wrapping<u32>,
}

/// One link of a bucket chain. Nodes reference their entry through the
/// insertion counter, never by FIFO position, so eviction needs no
/// renumbering.
#[derive(Debug)]
struct ChainNode {
    hash: usize,
    counter: Wrapping<u32>,
    next: Option<Box<ChainNode>>,
}

#[derive(Debug)]
pub struct HeaderIndex {
    // 首部为最新的表项
    table: VecDeque<Entry>,
    buckets: [Option<Box<ChainNode>>; BUCKET_COUNT],
    size: usize,
    capacity: usize,
    // 每次插入时递减, 仅作为相对偏移使用, 允许回绕
    counter: Wrapping<u32>,
}

impl HeaderIndex {
    pub fn with_capacity(capacity: usize) -> HeaderIndex {
        HeaderIndex {
            table: VecDeque::new(),
            buckets: Default::default(),
            size: 0,
            capacity,
            counter: Wrapping(0),
        }
    }

    pub fn length(&self) -> usize {
        self.table.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn hash_name(name: &[u8]) -> usize {
        let mut h = Wrapping(0i32);
        for &b in name {
            h = h * Wrapping(31) + Wrapping(b as i32);
        }
        (h.0 & 0x7fff_ffff) as usize
    }

    /// 1-based dynamic index of the newest exact (name, value) match.
    pub fn find_field(&self, name: &[u8], value: &[u8]) -> Option<usize> {
        let hash = Self::hash_name(name);
        let mut cur = self.buckets[hash % BUCKET_COUNT].as_deref();
        while let Some(node) = cur {
            if node.hash == hash {
                let entry = self.entry_at(node.counter)?;
                if entry.field.name == name && entry.field.value == value {
                    return Some(self.index_of(node.counter));
                }
            }
            cur = node.next.as_deref();
        }
        None
    }

    /// 1-based dynamic index of the newest entry carrying `name`.
    pub fn find_name(&self, name: &[u8]) -> Option<usize> {
        let hash = Self::hash_name(name);
        let mut cur = self.buckets[hash % BUCKET_COUNT].as_deref();
        while let Some(node) = cur {
            if node.hash == hash {
                let entry = self.entry_at(node.counter)?;
                if entry.field.name == name {
                    return Some(self.index_of(node.counter));
                }
            }
            cur = node.next.as_deref();
        }
        None
    }

    /// Counters decrease with each insertion, so the offset from the newest
    /// entry is the counter distance. Wrapping subtraction keeps this valid
    /// after the counter rolls over.
    fn index_of(&self, counter: Wrapping<u32>) -> usize {
        let newest = self.table.front().map_or(counter, |entry| entry.counter);
        (counter - newest).0 as usize + 1
    }

    fn entry_at(&self, counter: Wrapping<u32>) -> Option<&Entry> {
        let newest = self.table.front()?.counter;
        self.table.get((counter - newest).0 as usize)
    }

    /// Appends as the newest entry with the same eviction rules as the
    /// decoder's table, keeping the bucket chains in lockstep.
    pub fn add(&mut self, field: HeaderField) {
        let entry_size = field.size();
        if entry_size > self.capacity {
            self.clear();
            return;
        }
        while self.size + entry_size > self.capacity {
            self.remove();
        }
        self.counter -= Wrapping(1);
        let hash = Self::hash_name(&field.name);
        let node = ChainNode {
            hash,
            counter: self.counter,
            next: self.buckets[hash % BUCKET_COUNT].take(),
        };
        self.buckets[hash % BUCKET_COUNT] = Some(Box::new(node));
        self.size += entry_size;
        self.table.push_front(Entry {
            field,
            hash,
            counter: self.counter,
        });
    }

    /// 淘汰最老的表项, 同时从桶链中摘除
    pub fn remove(&mut self) {
        if let Some(entry) = self.table.pop_back() {
            self.size -= entry.field.size();
            self.unlink(entry.hash, entry.counter);
        }
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.buckets = Default::default();
        self.size = 0;
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if capacity == 0 {
            self.clear();
            return;
        }
        while self.size > capacity {
            self.remove();
        }
    }

    /// Evicts until `needed` more octets fit, or the table is empty.
    pub fn ensure_free(&mut self, needed: usize) {
        while self.size + needed > self.capacity && self.length() > 0 {
            self.remove();
        }
    }

    /// Converts the current state of the table to a `Vec`, newest first.
    pub fn to_vec(&self) -> Vec<HeaderField> {
        self.table.iter().map(|entry| entry.field.clone()).collect()
    }

    fn unlink(&mut self, hash: usize, counter: Wrapping<u32>) {
        let mut cur = &mut self.buckets[hash % BUCKET_COUNT];
        loop {
            let is_match = match cur {
                Some(node) => node.counter == counter,
                None => break,
            };
            if is_match {
                if let Some(mut node) = cur.take() {
                    *cur = node.next.take();
                }
                break;
            }
            cur = &mut cur.as_mut().unwrap().next;
        }
    }
}
