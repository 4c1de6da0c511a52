use crate::{
    collection::Document,
    errors::{NitriteError, NitriteResult},
    SortOrder,
};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};

// Make SortedStream generic over the input iterator type
pub(crate) struct SortedStream {
    sorted: Vec<NitriteResult<Document>>,
    error: Option<NitriteError>,
    current_index: usize,
}

impl SortedStream {
    pub fn new<I: Iterator<Item = NitriteResult<Document>>> (
        raw_stream: I,
        sort_order: Vec<(String, SortOrder)>,
        collator: Option<CollatorBorrowed>,
    ) -> Self {
        let unsorted = raw_stream.collect::<Vec<NitriteResult<Document>>>();
        let mut error = None;

        let mut cleaned = Vec::with_capacity(unsorted.len());
        for doc in unsorted.iter() {
            if doc.is_err() {
                error = doc.as_ref().err().cloned();
                break;
            }
            cleaned.push(doc.clone());
        }

        let has_collator = collator.is_some();
        
        cleaned.sort_by(|a, b| {
            for (field, order) in sort_order.iter() {
                // Safe extraction with proper error handling - avoid double unwrap
                let a_value = match a.as_ref() {
                    Ok(doc) => match doc.get(field) {
                        Ok(val) => val,
                        Err(_) => {
                            // Field missing or error in document A
                            return std::cmp::Ordering::Less;
                        }
                    },
                    Err(_) => return std::cmp::Ordering::Less,
                };

                let b_value = match b.as_ref() {
                    Ok(doc) => match doc.get(field) {
                        Ok(val) => val,
                        Err(_) => {
                            // Field missing or error in document B
                            return std::cmp::Ordering::Greater;
                        }
                    },
                    Err(_) => return std::cmp::Ordering::Greater,
                };

                // Handle null values
                let cmp = if a_value.is_null() && !b_value.is_null() {
                    std::cmp::Ordering::Less
                } else if !a_value.is_null() && b_value.is_null() {
                    std::cmp::Ordering::Greater
                } else if a_value.is_null() && b_value.is_null() {
                    std::cmp::Ordering::Equal
                } else if a_value.is_string() && b_value.is_string() && has_collator {
                    let a = a_value.as_string().unwrap();
                    let b = b_value.as_string().unwrap();
                    collator.as_ref().map(|cb| cb.compare(a, b)).unwrap_or_else(|| a.cmp(b))
                } else if a_value.is_string() && b_value.is_string() {
                    let a = a_value.as_string().unwrap();
                    let b = b_value.as_string().unwrap();
                    a.cmp(b)
                } else {
                    a_value.cmp(&b_value)
                };

                if cmp != std::cmp::Ordering::Equal {
                    return match order {
                        SortOrder::Ascending => cmp,
                        SortOrder::Descending => cmp.reverse(),
                    };
                }
            }
            std::cmp::Ordering::Equal
        });

        Self {
            sorted: cleaned,
            error,
            current_index: 0,
        }
    }
}

impl Iterator for SortedStream {
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        // fail fast if any error occurs
        if let Some(error) = self.error.clone() {
            return Some(Err(error));
        }

        if self.current_index < self.sorted.len() {
            let result = self.sorted[self.current_index].clone();
            self.current_index += 1;
            Some(result)
        } else {
            None
        }
    }
}
