// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scan Tests
//!
//! Linear scans, index scans and their agreement on the same column.

use colstore::executor::scan::{col_scan, fetch, index_scan, select_column, vec_scan, ScanMethod};
use colstore::storage::Table;
use colstore::{Error, IndexType};

fn sorted(mut v: Vec<i32>) -> Vec<i32> {
    v.sort_unstable();
    v
}

fn table_with(values: &[i32], leading: bool, index: IndexType) -> Table {
    let mut table = Table::new("t", 2, 4);
    table.create_column("a", leading).unwrap();
    table.create_column("b", false).unwrap();
    for (i, &v) in values.iter().enumerate() {
        table.insert_row(&[v, i as i32]).unwrap();
    }
    if index != IndexType::None {
        table.create_index("a", index).unwrap();
    }
    table.organize().unwrap();
    table
}

#[test]
fn test_col_scan_half_open() {
    assert_eq!(col_scan(&[5, 3, 8, 3, 1], 3, 8), vec![1, 3]);
    assert!(col_scan(&[5, 3], 4, 4).is_empty());
    assert_eq!(col_scan(&[], 0, 10), Vec::<i32>::new());
}

#[test]
fn test_vec_scan() {
    assert_eq!(vec_scan(&[4, 7, 9], &[10, 20, 30], 15, 31).unwrap(), vec![7, 9]);
    assert!(matches!(
        vec_scan(&[1], &[1, 2], 0, 5),
        Err(Error::LengthMismatch { .. })
    ));
}

#[test]
fn test_index_agrees_with_linear_scan() {
    let values: Vec<i32> = (0..400).map(|i| (i * 37 % 101) - 50).collect();
    let ranges = [(-50, 51), (0, 1), (-10, 10), (40, 200), (i32::MIN, i32::MAX)];
    for (leading, index) in [
        (false, IndexType::Sorted),
        (false, IndexType::BPlusTree),
        (true, IndexType::None),
        (true, IndexType::Sorted),
        (true, IndexType::BPlusTree),
    ] {
        let table = table_with(&values, leading, index);
        let column = table.column("a").unwrap();
        for (lower, upper) in ranges {
            assert_eq!(
                sorted(index_scan(column, lower, upper).unwrap()),
                col_scan(column.data(), lower, upper),
                "leading {} index {} range [{}, {})",
                leading,
                index,
                lower,
                upper
            );
        }
    }
}

#[test]
fn test_scan_method_selection() {
    let values = [3, 1, 2];
    let plain = table_with(&values, false, IndexType::None);
    assert_eq!(ScanMethod::for_column(plain.column("a").unwrap()), ScanMethod::Linear);
    assert!(matches!(
        index_scan(plain.column("a").unwrap(), 0, 5),
        Err(Error::IndexMissing(_))
    ));
    assert_eq!(select_column(plain.column("a").unwrap(), 2, 4), vec![0, 2]);

    let secondary = table_with(&values, false, IndexType::BPlusTree);
    assert_eq!(
        ScanMethod::for_column(secondary.column("a").unwrap()),
        ScanMethod::SecondaryIndex
    );

    let clustered = table_with(&values, true, IndexType::BPlusTree);
    assert_eq!(
        ScanMethod::for_column(clustered.column("a").unwrap()),
        ScanMethod::LeadingBPlusTree
    );
    assert_eq!(clustered.column("a").unwrap().data(), &[1, 2, 3]);
    // other columns follow the leading order
    assert_eq!(clustered.column("b").unwrap().data(), &[1, 2, 0]);
}

#[test]
fn test_fetch() {
    assert_eq!(fetch(&[10, 20, 30], &[2, 0, 2]).unwrap(), vec![30, 10, 30]);
    assert!(matches!(
        fetch(&[10], &[1]),
        Err(Error::PositionOutOfBounds { position: 1, len: 1 })
    ));
    assert!(fetch(&[10], &[-1]).is_err());
}

#[test]
fn test_secondary_index_maintained_on_insert() {
    let mut table = table_with(&[5, 6], false, IndexType::Sorted);
    table.insert_row(&[4, 9]).unwrap();
    table.insert_row(&[6, 9]).unwrap();
    assert!(table.is_organized());
    let column = table.column("a").unwrap();
    assert_eq!(index_scan(column, 5, 7).unwrap(), vec![0, 1, 3]);
}
