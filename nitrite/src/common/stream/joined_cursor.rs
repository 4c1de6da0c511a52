use crate::collection::Document;
use crate::common::stream::document_cursor::DocumentCursor;
use crate::common::Value;
use crate::errors::NitriteResult;
use std::collections::HashSet;

pub struct JoinedDocumentCursor<'a> {
    iter: &'a mut DocumentCursor,
    foreign_cursor: &'a mut DocumentCursor,
    lookup: &'a Lookup,
}

pub struct Lookup {
    pub local_field: String,
    pub foreign_field: String,
    pub target_field: String,
}

impl Lookup {
    pub fn new(local_field: &str, foreign_field: &str, target_field: &str) -> Self {
        Lookup {
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            target_field: target_field.to_string(),
        }
    }
}

impl<'a> JoinedDocumentCursor<'a> {
    pub(crate) fn new(
        iter: &'a mut DocumentCursor,
        foreign_cursor: &'a mut DocumentCursor,
        lookup: &'a Lookup,
    ) -> Self {
        JoinedDocumentCursor {
            iter,
            foreign_cursor,
            lookup,
        }
    }

    pub fn size(&mut self) -> usize {
        let mut count = 0;
        // Consume all joined documents.
        while self.next().is_some() {
            count += 1;
        }
        // Reset both underlying cursors for replayability.
        self.iter.reset();
        self.foreign_cursor.reset();
        count
    }

    pub fn reset(&mut self) {
        // Reset both underlying cursors.
        self.iter.reset();
        self.foreign_cursor.reset();
    }
}

impl<'a> Iterator for JoinedDocumentCursor<'a> {
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.iter.next()?;
        
        // Use proper match pattern instead of anti-pattern is_err() + err().unwrap()
        match doc {
            Ok(doc_value) => {
                // Reset the foreign cursor before each join so it can be replayed.
                self.foreign_cursor.reset();
                let joined_doc = join(doc_value, self.foreign_cursor, self.lookup);
                Some(joined_doc)
            }
            Err(e) => {
                // Propagate error directly without unnecessary checks
                log::error!("Error in joined cursor iteration: {:?}", e);
                Some(Err(e))
            }
        }
    }
}

fn join(
    doc: Document,
    foreign_cursor: &mut DocumentCursor,
    lookup: &Lookup,
) -> NitriteResult<Document> {
    let mut local_doc = doc.clone();
    let local_obj = local_doc.get(&lookup.local_field)?;
    
    // Cache field names to avoid repeated string copies in hot loop
    let foreign_field = &lookup.foreign_field;
    let target_field = &lookup.target_field;
    
    let mut target = Vec::with_capacity(8); // Preallocate typical capacity
    
    // Iterate over the foreign cursor which has been reset.
    for foreign_doc in foreign_cursor {
        let foreign_doc = foreign_doc?;
        let foreign_obj = foreign_doc.get(foreign_field)?;
        if local_obj == foreign_obj {
            target.push(Value::Document(foreign_doc.clone()));
        }
    }

    if !target.is_empty() {
        local_doc.put(target_field, Value::Array(target))?;
    }

    Ok(local_doc)
}
