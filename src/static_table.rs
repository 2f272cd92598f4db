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
// Created Date: 2023/09/15 11:08:54

//! The fixed 61-entry table every HPACK peer shares, indices 1 through 61.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{HpackError, HpackResult};

pub const STATIC_TABLE_LEN: usize = 61;

/// (HPACK, Appendix A)
static STATIC_TABLE_RAW: [(&'static str, &'static str); STATIC_TABLE_LEN] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

lazy_static! {
    // 反向遍历, 同名时保留最小的索引
    static ref STATIC_NAME_MAP: HashMap<&'static [u8], usize> = {
        let mut m = HashMap::<&'static [u8], usize>::new();
        for (idx, &(name, _)) in STATIC_TABLE_RAW.iter().enumerate().rev() {
            m.insert(name.as_bytes(), idx + 1);
        }
        m
    };
}

/// The entry at the 1-based `index`.
pub fn get_entry(index: usize) -> HpackResult<(&'static [u8], &'static [u8])> {
    if index >= 1 && index <= STATIC_TABLE_LEN {
        let (name, value) = STATIC_TABLE_RAW[index - 1];
        Ok((name.as_bytes(), value.as_bytes()))
    } else {
        Err(HpackError::OutOfRange)
    }
}

/// The smallest index whose entry carries `name`.
pub fn index_by_name(name: &[u8]) -> Option<usize> {
    STATIC_NAME_MAP.get(name).copied()
}

/// The index of the entry matching both `name` and `value`. Entries sharing
/// a name sit in one contiguous run, so the scan stops at the first foreign
/// name.
pub fn index_by_name_value(name: &[u8], value: &[u8]) -> Option<usize> {
    let first = index_by_name(name)?;
    for index in first..=STATIC_TABLE_LEN {
        let (entry_name, entry_value) = STATIC_TABLE_RAW[index - 1];
        if entry_name.as_bytes() != name {
            break;
        }
        if entry_value.as_bytes() == value {
            return Some(index);
        }
    }
    None
}
